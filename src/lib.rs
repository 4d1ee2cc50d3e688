//! vidtube - user accounts with cookie-delivered access/refresh sessions
//!
//! This is the library interface for vidtube: the session lifecycle,
//! token handling, account store contract and the HTTP API built on them.

pub mod accounts;
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod session;

pub use config::Config;
pub use error::Error;
pub use session::SessionController;

//! HTTP API server

pub mod multipart;
pub mod response;
pub mod routes;
pub mod server;

pub use response::{ApiResponse, ErrorBody};
pub use server::*;

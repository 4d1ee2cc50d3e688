//! User accounts and their persistence

pub mod models;
pub mod store;

pub use models::{Account, AccountPatch, NewAccount, PublicAccount};
pub use store::{AccountStore, MemoryAccountStore};

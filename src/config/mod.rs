//! Configuration management for vidtube

pub mod loader;
mod schema;

pub use loader::{load_config, load_config_from_path, parse_config};
pub use schema::*;

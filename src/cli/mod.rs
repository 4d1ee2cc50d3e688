//! CLI interface for vidtube

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidtube")]
#[command(version)]
#[command(about = "User accounts with cookie-based sessions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default vidtube.toml configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the configuration file (searched upward from the working directory otherwise)
        #[arg(short, long, env = "VIDTUBE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Load and validate the configuration
    Check {
        /// Path to the configuration file
        #[arg(short, long, env = "VIDTUBE_CONFIG")]
        config: Option<PathBuf>,
    },
}

//! CLI module - Command-line interface for the parking-alert backend
//!
//! This module provides a structured CLI using clap for argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parking-alert backend: accounts and Slovenian parking reference data
#[derive(Parser)]
#[command(name = "parking-alert")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (default: search the usual locations)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Apply database migrations and exit
    Migrate,

    /// Write a default config.toml if none exists
    InitConfig,

    /// Register an image usable as a default avatar
    AddAvatar {
        /// Image URL
        url: String,
    },

    /// Change a user's role (1 = admin, 2 = default)
    SetRole {
        /// User ID
        user_id: i32,
        /// Role ID
        role_id: i32,
    },
}

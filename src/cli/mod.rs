//! CLI module - Command-line interface for lendtrack
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// lendtrack - Equipment lending tracker
/// Users, items and borrow requests over a small HTTP API
#[derive(Parser)]
#[command(name = "lendtrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Drop and recreate every table
    ResetDb {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Create a user with the admin role
    CreateAdmin {
        username: String,
        email: String,
        password: String,
    },

    /// List registered users
    #[command(alias = "ls")]
    Users,
}

pub use commands::*;

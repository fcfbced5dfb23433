//! CLI module - command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `seed` - Bootstrap the initial admin account

pub mod args;

pub use args::{Cli, Commands};

//! CLI module for the Document Gateway
//!
//! - `serve`: HTTP API plus the background upload processor

pub mod serve;

use clap::{Parser, Subcommand};

/// Document Gateway - document intake with asynchronous publishing
#[derive(Parser)]
#[command(name = "document-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server and upload processor
    Serve(serve::ServeArgs),
}

//! Command-line interface for the interview escape server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Interview Escape - internship interview training game
#[derive(Parser, Debug)]
#[command(name = "interview_escape")]
#[command(about = "Interview training escape game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,
    },

    /// Print stored results, newest first, with the average score
    Results,
}

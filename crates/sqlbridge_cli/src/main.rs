//! SqlBridge CLI
//!
//! Runs SQL through the handle-based bridge API against SQLite.
//!
//! # Commands
//!
//! - `query` - Run a query and print its rows
//! - `exec` - Run statements and print affected row counts
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// SqlBridge command-line tools.
#[derive(Parser)]
#[command(name = "sqlbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query and print its rows
    Query {
        /// Connection string (`:memory:`, `sqlite://<path>` or a file path)
        #[arg(short, long)]
        conn: String,

        /// SQL query text
        sql: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Run statements and print affected row counts
    Exec {
        /// Connection string (`:memory:`, `sqlite://<path>` or a file path)
        #[arg(short, long)]
        conn: String,

        /// SQL statements, run in order
        #[arg(required = true)]
        sql: Vec<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Query { conn, sql, format } => {
            commands::query::run(&conn, &sql, &format)?;
        }
        Commands::Exec { conn, sql } => {
            commands::exec::run(&conn, &sql)?;
        }
        Commands::Version => {
            println!("SqlBridge CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("SqlBridge Core v{}", sqlbridge_core::VERSION);
        }
    }

    Ok(())
}

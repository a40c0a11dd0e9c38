//! nkdb CLI
//!
//! Command-line access to an nkdb CSV database.
//!
//! # Commands
//!
//! - `keys` - List every key in dataset order
//! - `get` - Print one record
//! - `set` - Insert or overwrite one record
//! - `delete` - Remove one record

mod commands;

use clap::{Parser, Subcommand};
use nkdb_core::{Config, Database};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// nkdb command-line record tools.
#[derive(Parser)]
#[command(name = "nkdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the CSV data file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Index of the key field within each record
    #[arg(global = true, short, long, default_value = "0")]
    key_field: usize,

    /// Serve loads from memory for this many milliseconds
    #[arg(global = true, long)]
    cache_ttl_ms: Option<u64>,

    /// Give up waiting for the database lock after this many milliseconds
    #[arg(global = true, long)]
    lock_timeout_ms: Option<u64>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every key in dataset order
    Keys {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the record stored under a key
    Get {
        /// Key to look up
        key: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Insert or overwrite a record; its key is taken from the key field
    Set {
        /// Record fields, in order
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Remove the record stored under a key (absent keys are ignored)
    Delete {
        /// Key to remove
        key: String,
    },

    /// Show version information
    Version,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::new().key_field(self.key_field);
        if let Some(ms) = self.cache_ttl_ms {
            config = config.cache_ttl(Duration::from_millis(ms));
        }
        if let Some(ms) = self.lock_timeout_ms {
            config = config.lock_timeout(Duration::from_millis(ms));
        }
        config
    }

    fn open(&self, command: &str) -> Result<Database, Box<dyn std::error::Error>> {
        let path = self
            .path
            .as_ref()
            .ok_or(format!("Database path required for {command}"))?;
        Ok(Database::open(path, self.config()))
    }
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

    let mut out = std::io::stdout().lock();

    match &cli.command {
        Commands::Keys { format } => {
            let db = cli.open("keys")?;
            commands::keys::run(&db, format, &mut out)?;
        }
        Commands::Get { key, format } => {
            let db = cli.open("get")?;
            commands::get::run(&db, key, format, &mut out)?;
        }
        Commands::Set { fields } => {
            let db = cli.open("set")?;
            commands::set::run(&db, fields.clone())?;
        }
        Commands::Delete { key } => {
            let db = cli.open("delete")?;
            commands::delete::run(&db, key)?;
        }
        Commands::Version => {
            println!("nkdb CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("nkdb Core v{}", nkdb_core::VERSION);
        }
    }

    Ok(())
}

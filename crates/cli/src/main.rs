//! MycoPet CLI - Preview and replay customer profile updates.
//!
//! # Usage
//!
//! ```bash
//! # Show how a saved webhook payload would be coerced (no network)
//! mycopet-cli preview --file payload.json
//!
//! # Same, reading the payload from stdin
//! cat payload.json | mycopet-cli preview --file -
//!
//! # Push fields for one customer through the same path as the relay
//! mycopet-cli update -e owner@example.com -f pet_weight_kg=12,5 -f favorite_toy=ball
//! ```
//!
//! # Commands
//!
//! - `preview` - Coerce a payload's fields and print the typed metafields
//! - `update` - Look up a customer and write metafields via the Admin API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mycopet-cli")]
#[command(author, version, about = "MycoPet profile relay tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Coerce the fields of a webhook payload and print the result
    Preview {
        /// Payload JSON file, or `-` for stdin
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Write profile fields to a customer through the Admin API
    Update {
        /// Customer email address
        #[arg(short, long)]
        email: String,

        /// Field as `key=value` (repeatable)
        #[arg(short, long = "field", value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,

        /// Metafield namespace for all fields
        #[arg(short, long)]
        namespace: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Preview { file } => commands::preview::run(&file)?,
        Commands::Update {
            email,
            fields,
            namespace,
        } => commands::update::run(&email, &fields, namespace.as_deref()).await?,
    }
    Ok(())
}

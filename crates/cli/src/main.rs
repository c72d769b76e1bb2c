//! Cadastro CLI - Database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! cadastro-cli migrate
//!
//! # Insert demo clientes and enderecos
//! cadastro-cli seed
//!
//! # Validate the demo data without connecting
//! cadastro-cli seed --dry-run
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed database with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cadastro-cli")]
#[command(author, version, about = "Cadastro CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert demo clientes and enderecos
    Seed {
        /// Validate the demo data without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { dry_run } => commands::seed::run(dry_run).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_dry_run() {
        let cli = Cli::try_parse_from(["cadastro-cli", "seed", "--dry-run"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed { dry_run: true })
        ));
    }
}

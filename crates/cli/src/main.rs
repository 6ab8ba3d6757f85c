//! Woo Storefront CLI - Session store migration and operational checks.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table used by the storefront
//! ws-cli migrate
//!
//! # Verify WooCommerce credentials by listing categories
//! ws-cli check
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create the `tower_sessions` schema and table
//! - `check` - Call the WooCommerce REST API with the configured keys

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ws-cli")]
#[command(author, version, about = "Woo Storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the session store table
    Migrate,
    /// Check WooCommerce connectivity and credentials
    Check,
}

#[tokio::main]
async fn main() {
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
        Commands::Migrate => commands::migrate::session_store().await?,
        Commands::Check => commands::check::woocommerce().await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        assert!(matches!(
            Cli::try_parse_from(["ws-cli", "migrate"]).map(|c| c.command),
            Ok(Commands::Migrate)
        ));
        assert!(matches!(
            Cli::try_parse_from(["ws-cli", "check"]).map(|c| c.command),
            Ok(Commands::Check)
        ));
        assert!(Cli::try_parse_from(["ws-cli", "seed"]).is_err());
    }
}

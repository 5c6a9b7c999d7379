//! Bangaliana CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bangaliana-cli migrate
//!
//! # Grant the admin role (creates the user record if needed)
//! bangaliana-cli admin grant -e chef@example.com
//!
//! # Inspect payments recorded against an order
//! bangaliana-cli payments list -o <order-id>
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin grant` - Bootstrap administrators; over HTTP only an existing
//!   admin can elevate another user
//! - `payments list` - Reconcile an order against its recorded payments

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bangaliana-cli")]
#[command(author, version, about = "Bangaliana CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage administrators
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect recorded payments
    Payments {
        #[command(subcommand)]
        action: PaymentsAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant the admin role to a user
    Grant {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum PaymentsAction {
    /// List payments recorded against an order
    List {
        /// Order id (UUID)
        #[arg(short, long)]
        order_id: String,
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
        Commands::Admin { action } => match action {
            AdminAction::Grant { email } => commands::admin::grant(&email).await?,
        },
        Commands::Payments { action } => match action {
            PaymentsAction::List { order_id } => commands::payments::list(&order_id).await?,
        },
    }
    Ok(())
}

//! Caja CLI - Database migrations, seed data and user management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! caja-cli migrate
//!
//! # Insert profiles, permissions, payment methods, categories and the admin user
//! caja-cli seed
//!
//! # Create a staff account
//! caja-cli user create -u cajero1 -e cajero1@tienda.mx -p 's3cret-pass' --profile Cashier \
//!     --first-name Ana --last-name López
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed reference data (safe to run repeatedly)
//! - `user create` - Create staff accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "caja-cli")]
#[command(author, version, about = "Caja POS CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed profiles, permissions, payment methods, categories and the admin user
    Seed,
    /// Manage staff accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new staff account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Profile name (`Administrator`, `Cashier`, `Manager`)
        #[arg(long, default_value = "Cashier")]
        profile: String,

        #[arg(long, default_value = "Caja")]
        first_name: String,

        #[arg(long, default_value = "User")]
        last_name: String,
    },
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => {
            commands::seed::run().await?;
        }
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                password,
                profile,
                first_name,
                last_name,
            } => {
                let account = commands::user::NewAccount {
                    username,
                    email,
                    password: password.into(),
                    profile,
                    first_name,
                    last_name,
                };
                commands::user::create(account).await?;
            }
        },
    }
    Ok(())
}

//! Tasklists CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Create the schema and the session table
//! tl-cli migrate
//!
//! # Create an account
//! tl-cli user create -u alice -p 'correct horse'
//!
//! # Show accounts with how many lists each owns
//! tl-cli user list
//!
//! # Delete an account together with its lists and tasks
//! tl-cli user delete -u alice
//! ```
//!
//! # Environment Variables
//!
//! - `TASKLISTS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tl-cli")]
#[command(author, version, about = "Tasklists CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (schema and session store)
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// List accounts with their list counts
    List,
    /// Delete an account; its lists and tasks are deleted with it
    Delete {
        /// Login name
        #[arg(short, long)]
        username: String,
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
        Commands::User { action } => match action {
            UserAction::Create { username, password } => {
                commands::user::create(&username, &password).await?;
            }
            UserAction::List => commands::user::list().await?,
            UserAction::Delete { username } => commands::user::delete(&username).await?,
        },
    }
    Ok(())
}

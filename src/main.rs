//! Note Keeper - Main Server
//!
//! Serves the notes web application and manages accounts from the command line.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use note_keeper::users::{forms::validate_username, UserError, UserManager};
use note_keeper::{open_store, Config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "note-keeper")]
#[command(about = "Personal notes web application")]
struct Cli {
    /// Path to the YAML config file (default: ./config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on (overrides config.yaml and SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create an account that can log in with a password
    CreateUser {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password (falls back to NOTE_KEEPER_PASSWORD)
        #[arg(long, env = "NOTE_KEEPER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,note_keeper=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            note_keeper::start_server(config).await
        }
        Commands::CreateUser { username, password } => {
            run_create_user(config, &username, &password).await
        }
    }
}

async fn run_create_user(config: Config, username: &str, password: &str) -> Result<()> {
    let username = username.trim();
    if let Some(problem) = validate_username(username).into_iter().next() {
        bail!("Invalid username: {}", problem);
    }

    let store = Arc::new(open_store(&config)?);
    let users = UserManager::new(store, config.auth.bcrypt_cost);

    match users.create_with_password(username, password).await {
        Ok(user) => {
            tracing::info!("Created user {} ({})", user.username, user.id);
            Ok(())
        }
        Err(UserError::Invalid(_)) => bail!("User {} already exists", username),
        Err(e) => Err(e.into()),
    }
}

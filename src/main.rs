use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sart::config::{CONFIG_FILE_NAME, ServerConfig};
use sart::server::{AppState, create_router};
use sart::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "sart")]
#[command(about = "Asset inventory and repair ticketing server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and a default config file
    Init {
        /// Data directory for the database and config
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Start the server
    Serve {
        /// Config file (defaults to sart.toml in the data directory)
        #[arg(long, short)]
        config: Option<String>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<String>,

        /// Refuse a new ticket while the device has a pending one
        #[arg(long)]
        one_pending_ticket_per_device: bool,

        /// Refuse to delete devices that have closed tickets
        #[arg(long)]
        protect_ticket_history: bool,
    },
}

fn run_init(data_dir: String) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir: data_dir.into(),
        ..Default::default()
    };
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;
    let seeded = store.ensure_periods(Local::now().date_naive())?;

    let config_path = config.config_path();
    if !config_path.exists() {
        config.save(&config_path)?;
    }

    println!();
    println!("Database: {}", config.db_path().display());
    println!("Config:   {}", config_path.display());
    println!("Seeded {seeded} period(s)");
    println!();

    Ok(())
}

fn load_config(
    config: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<String>,
    one_pending_ticket_per_device: bool,
    protect_ticket_history: bool,
) -> anyhow::Result<ServerConfig> {
    let mut resolved = match config {
        Some(path) => ServerConfig::load(&PathBuf::from(path))?,
        None => {
            let dir = data_dir
                .as_deref()
                .map_or_else(|| ServerConfig::default().data_dir, PathBuf::from);
            let path = dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                ServerConfig::load(&path)?
            } else {
                ServerConfig::default()
            }
        }
    };

    if let Some(host) = host {
        resolved.host = host;
    }
    if let Some(port) = port {
        resolved.port = port;
    }
    if let Some(data_dir) = data_dir {
        resolved.data_dir = data_dir.into();
    }
    if one_pending_ticket_per_device {
        resolved.one_pending_ticket_per_device = true;
    }
    if protect_ticket_history {
        resolved.protect_ticket_history = true;
    }

    Ok(resolved)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sart=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => {
            run_init(data_dir)?;
        }
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
            one_pending_ticket_per_device,
            protect_ticket_history,
        } => {
            let config = load_config(
                config,
                host,
                port,
                data_dir,
                one_pending_ticket_per_device,
                protect_ticket_history,
            )?;

            let db_path = config.db_path();
            if !db_path.exists() {
                bail!(
                    "Database not found at {}. Run 'sart init' first.",
                    db_path.display()
                );
            }

            let store = SqliteStore::new(&db_path)?.with_ticket_policy(config.ticket_policy());
            store.initialize()?;
            store.ensure_periods(Local::now().date_naive())?;

            info!(
                one_pending_ticket_per_device = config.one_pending_ticket_per_device,
                protect_ticket_history = config.protect_ticket_history,
                "Using database {}",
                db_path.display()
            );

            let state = Arc::new(AppState::new(Arc::new(store)));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

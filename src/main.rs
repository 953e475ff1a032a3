use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use confgen::config::ServerConfig;
use confgen::server::{AppState, create_router};
use confgen::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "confgen")]
#[command(about = "A configuration template server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the server (create data directory and database)
    Init {
        /// Data directory for the database and exported configurations
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database and exported configurations
        #[arg(long)]
        data_dir: Option<String>,

        /// Directory rendered configurations are exported to.
        /// Defaults to "<data-dir>/export".
        #[arg(long)]
        export_dir: Option<String>,

        /// Path to a TOML configuration file. Command-line flags take
        /// precedence over values from the file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn run_init(data_dir: String) -> anyhow::Result<()> {
    let data_path: PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("confgen.db");
    if db_path.exists() {
        bail!("Server already initialized. Database exists at: {}", db_path.display());
    }

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    println!("Initialized confgen database at {}", db_path.display());

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("confgen=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => {
            run_init(data_dir)?;
        }
        Commands::Serve {
            host,
            port,
            data_dir,
            export_dir,
            config,
        } => {
            let mut config = match config {
                Some(path) => ServerConfig::from_file(&path)?,
                None => ServerConfig::default(),
            };
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir.into();
            }
            if let Some(export_dir) = export_dir {
                config.export_dir = Some(export_dir.into());
            }

            let db_path = config.db_path();
            if !db_path.exists() {
                bail!(
                    "Server not initialized. Run 'confgen init' first to create the database."
                );
            }

            let store = SqliteStore::new(&db_path)?;
            store.initialize()?;

            let state = Arc::new(AppState {
                store: Arc::new(store),
                export_dir: config.export_path(),
            });

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

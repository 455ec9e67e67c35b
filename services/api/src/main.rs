use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use musica_api::{AppConfig, AppState, create_router, docs};
use musica_common::database::{DatabaseConfig, health_check, init_pool, run_migrations};

#[derive(Parser)]
#[command(name = "musica-api", version, about = docs::DESCRIPCION)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve {
        /// Interface to bind, overrides MUSICA_HOST
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overrides MUSICA_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Write the API documentation documents
    Docs {
        /// Directory that receives the JSON files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Docs { output } => docs::write_documents(&output, &config),
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    info!("Starting music catalog service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let app = create_router(AppState::new(pool, config.clone()));

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Music catalog service listening on {}", config.base_url());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Music catalog service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

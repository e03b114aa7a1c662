//! Ironmeet server - Main entry point
//!
//! Meet coordination service: owns the meet database, the progress
//! controller, and the SSE broadcast channel, and serves the REST API used
//! by the organizer console, judge panels, and public display.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ironmeet_common::config::Config;
use ironmeet_server::api::auth::JudgeRoster;
use ironmeet_server::meet::MeetController;
use ironmeet_server::sse::EventBroadcaster;
use ironmeet_server::{api, db};

/// Events buffered per SSE subscriber before a laggard starts dropping
const EVENT_BUFFER_CAPACITY: usize = 256;

/// Command-line arguments for ironmeet-server
#[derive(Parser, Debug)]
#[command(name = "ironmeet-server")]
#[command(about = "Powerlifting meet coordination server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "IRONMEET_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "IRONMEET_DATABASE")]
    database: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "IRONMEET_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ironmeet_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments and resolve configuration
    let args = Args::parse();
    let config = Config::load(args.port, args.database, args.config)
        .context("Failed to load configuration")?;

    info!("Starting ironmeet server on port {}", config.port);
    info!("Database: {}", config.database_path.display());

    // Open and initialize the meet database
    let pool = db::connect(&config.database_path)
        .await
        .context("Failed to open meet database")?;
    db::init::initialize_database(&pool)
        .await
        .context("Failed to initialize meet database")?;

    // Broadcast channel and meet progress controller
    let broadcaster = EventBroadcaster::new(EVENT_BUFFER_CAPACITY);
    let controller = Arc::new(MeetController::new(
        pool.clone(),
        broadcaster.clone(),
        config.verdict_policy,
    ));
    let judges = Arc::new(JudgeRoster::from_config(&config));

    let ctx = api::AppContext {
        db: pool,
        controller,
        broadcaster,
        judges,
    };

    api::server::run(&config, ctx)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

//! Gate operations HTTP server binary.
//!
//! Loads `gate-ops.toml`, builds the configured flight source and snapshot
//! cache, starts the background refresher for the default query, and serves
//! the REST API.
//!
//! # Usage
//!
//! ```bash
//! # Live Schiphol API
//! SCHIPHOL_APP_ID=... SCHIPHOL_APP_KEY=... cargo run --bin gate-ops-server
//!
//! # Replay a captured payload
//! GATE_OPS_CONFIG=demos/fixture.toml cargo run --bin gate-ops-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `GATE_OPS_CONFIG`: Explicit config path (default: search `gate-ops.toml`)
//! - `SCHIPHOL_APP_ID`, `SCHIPHOL_APP_KEY`: API credentials
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use gate_ops::config::{AppConfig, ConfigError};
use gate_ops::http::{create_router, AppState};
use gate_ops::services::snapshot_cache::{CachePolicy, SnapshotCache, SystemClock};
use gate_ops::sources::FlightQuery;

fn load_config() -> anyhow::Result<AppConfig> {
    let config = match env::var("GATE_OPS_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?,
        Err(_) => match AppConfig::from_default_location() {
            Ok(config) => config,
            Err(ConfigError::NotFound) => {
                warn!("No gate-ops.toml found, using defaults");
                AppConfig::default()
            }
            Err(e) => return Err(e.into()),
        },
    };
    let config = config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting gate operations server");

    let config = load_config()?;
    let source = config.build_source()?;
    info!("Using flight source '{}'", source.name());

    let cache = Arc::new(SnapshotCache::new(
        source,
        Arc::new(SystemClock),
        config.dashboard_params()?,
        CachePolicy {
            ttl: config.ttl(),
            fetch_timeout: config.fetch_timeout(),
            max_entries: config.cache.max_entries,
        },
    ));

    // Keep the default view warm; other queries are fetched on demand
    let _refresher = cache.spawn_refresh_loop(FlightQuery::default(), config.refresh_interval());

    let state = AppState::new(cache, config);
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movono_core::{
    create_authenticator, load_config, system_clock, validate_config, Authenticator,
    HttpLoginClient, MetadataCatalog, MovieStore, SqliteMovieStore, StoreBackend, SupabaseStore,
    SyncScheduler, TmdbClient, YtsApiClient,
};
use movono_server::{create_router, AppServices, AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("MOVONO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        "movono {} starting (config {})",
        VERSION,
        &config_hash[..16]
    );
    info!("Auth method: {:?}", config.auth.method);

    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Movie store
    let store: Arc<dyn MovieStore> = match config.store.backend {
        StoreBackend::Sqlite => {
            info!("Using SQLite store at {:?}", config.store.path);
            Arc::new(
                SqliteMovieStore::new(&config.store.path)
                    .context("Failed to open SQLite store")?,
            )
        }
        StoreBackend::Supabase => {
            let supabase = config
                .store
                .supabase
                .as_ref()
                .context("store.supabase settings missing")?;
            info!("Using hosted store at {}", supabase.url);
            Arc::new(SupabaseStore::new(supabase).context("Failed to create store client")?)
        }
    };

    // Torrent index
    if config.yts.username.is_none() || config.yts.password.is_none() {
        warn!("Torrent site credentials not configured; session routes will fail");
    }
    let login = Arc::new(HttpLoginClient::new(&config.yts));
    let index = Arc::new(
        YtsApiClient::new(&config.yts).context("Failed to create torrent index client")?,
    );
    info!("Torrent index at {}", config.yts.api_url);

    // Metadata API
    let catalog: Option<Arc<dyn MetadataCatalog>> = match &config.tmdb {
        Some(tmdb_config) => {
            info!("Initializing TMDB client");
            Some(Arc::new(
                TmdbClient::new(tmdb_config.clone()).context("Failed to create TMDB client")?,
            ))
        }
        None => {
            info!("TMDB not configured; upcoming sync and similar movies disabled");
            None
        }
    };

    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        AppServices {
            login,
            index,
            catalog,
            store,
            clock: system_clock(),
        },
    ));

    // Periodic sync
    let scheduler = config.sync.interval_secs.map(|secs| {
        let scheduler = SyncScheduler::new(Arc::clone(state.sync()), Duration::from_secs(secs));
        scheduler.start();
        scheduler
    });
    if scheduler.is_none() {
        info!("Periodic sync disabled; use POST /api/v1/sync");
    }

    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(scheduler) = scheduler {
        scheduler.stop();
    }
    info!("Server shut down");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

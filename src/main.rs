use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use song_catalog::{
    controllers::SongController,
    db::{Database, MemoryStore, SongStore},
    routers::build_router,
    secrets::{SecretManager, Settings, StoreBackend},
    seed::{load_seed, reset_catalog},
};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_target(false)
        .init();

    if let Err(e) = run().await {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = SecretManager::from_env().settings()?;
    let store = open_store(&settings).await?;

    if settings.seed_on_startup {
        let seed = load_seed(&settings.seed_path)?;
        reset_catalog(store.as_ref(), seed)
            .await
            .context("failed to seed the catalog")?;
    } else {
        info!("SEED_ON_STARTUP is off, keeping existing catalog");
    }

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", settings.port))
        .await
        .with_context(|| format!("could not bind port {}", settings.port))?;

    let app = build_router(SongController::new(store))
        .layer(TimeoutLayer::new(settings.request_timeout));

    info!("🎧 Song catalog listening on {}", listener.local_addr()?);
    info!("📡 Endpoints: /health /count /song /song/{{id}}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("Song catalog stopped");
    Ok(())
}

async fn open_store(settings: &Settings) -> anyhow::Result<Arc<dyn SongStore>> {
    match (&settings.backend, &settings.mongo) {
        (StoreBackend::Mongo, Some(mongo)) => {
            info!("connecting to url: {}", mongo.redacted_url());
            let database = Database::connect(mongo)
                .await
                .with_context(|| format!("could not connect to {}", mongo.redacted_url()))?;
            info!("📊 Connected to MongoDB");
            Ok(Arc::new(database))
        }
        (StoreBackend::Mongo, None) => {
            anyhow::bail!("MongoDB backend selected without connection settings")
        }
        (StoreBackend::Memory, _) => {
            warn!("Using the in-memory store; records are lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

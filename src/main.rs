use std::net::SocketAddr;
use std::sync::Arc;

use vocab_bot_rust::config::Config;
use vocab_bot_rust::create_app;
use vocab_bot_rust::db::PgStore;
use vocab_bot_rust::logging::init_tracing;
use vocab_bot_rust::seed::Seed;
use vocab_bot_rust::state::AppState;
use vocab_bot_rust::store::MemoryStore;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    let _log_guard = init_tracing(&config.log_level, config.log_dir.as_deref());

    let state = match PgStore::from_env().await {
        Ok(store) => AppState::postgres(store, config.store_timeout),
        Err(err) => {
            tracing::warn!(error = %err, "database not initialized, using in-memory store");
            AppState::memory(memory_store(&config), config.store_timeout)
        }
    };
    tracing::info!(
        store = state.backend().name(),
        store_timeout_ms = config.store_timeout.as_millis() as u64,
        "learning services ready"
    );

    let app = create_app(state);

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "bind listener failed");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "vocab-bot listening");

    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("Graceful shutdown complete");
}

fn memory_store(config: &Config) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    if let Some(path) = &config.seed_file {
        match Seed::load(path) {
            Ok(seed) => {
                seed.apply_to_memory(&store);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "seed file not loaded");
            }
        }
    }
    store
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
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
}

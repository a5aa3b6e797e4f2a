use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vizfolio_api::config::ServerConfig;
use vizfolio_api::router::build_app_router;
use vizfolio_api::state::AppState;
use vizfolio_gallery::{GalleryCache, PageFetcher};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vizfolio_api=debug,vizfolio_gallery=debug,vizfolio_store=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let store = vizfolio_store::create_store(&config.store)
        .await
        .expect("Failed to create gallery store");

    if let Err(e) = vizfolio_store::health_check(store.as_ref()).await {
        // The gallery degrades per request; keep serving.
        tracing::warn!(error = %e, "Store health check failed at startup");
    } else {
        tracing::info!("Store health check passed");
    }

    // --- Page cache ---
    let cache = Arc::new(GalleryCache::new(
        PageFetcher::new(store.clone()),
        config.gallery.fresh_for,
    ));
    tracing::info!(
        page_size = config.gallery.page_size,
        fresh_secs = config.gallery.fresh_for.as_secs(),
        "Gallery cache created",
    );

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        cache: Arc::clone(&cache),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Server error"),
        Err(e) => tracing::error!(error = %e, "Server task panicked"),
    }

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Wake any request still waiting on an in-flight page fetch.
    cache.shutdown();

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

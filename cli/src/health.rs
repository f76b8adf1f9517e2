//! Liveness endpoint for the hosting platform.

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> &'static str {
    "volscan is alive!"
}

async fn health() -> &'static str {
    "OK"
}

/// Serves the liveness routes until `shutdown` flips to `true`.
pub async fn serve(listener: TcpListener, mut shutdown: watch::Receiver<bool>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "liveness endpoint listening");
    }

    axum::serve(listener, router())
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
}

// HTTP surface: one route group per workflow over the shared intake engine

pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ErrorResponse};
pub use routes::{build_router, AppState};

use anyhow::{Context, Result};
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Serve the router on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .context("Listener has no local address")?;
    info!("Lab intake listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}

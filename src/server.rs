//! HTTP listener for the webhook router

use axum::Router;
use tokio::net::TcpListener;

use crate::{Error, Result};

/// Serve `router` on `0.0.0.0:<port>` until Ctrl-C
///
/// # Errors
///
/// Returns error if the listener fails to bind or the server fails
pub async fn serve(router: Router, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Config(format!("failed to bind {addr}: {e}")))?;

    serve_on(listener, router).await
}

/// Serve `router` on an already bound listener until Ctrl-C
///
/// # Errors
///
/// Returns error if the server fails
pub async fn serve_on(listener: TcpListener, router: Router) -> Result<()> {
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "webhook server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

//! TCP binding and graceful shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use nodes::PipelineOrchestrator;
use tokio::net::TcpListener;
use tracing::info;

use crate::{router, ListenerError};

/// Serves the trigger on `addr` until `shutdown` resolves.
///
/// In-flight runs are allowed to finish; a run whose caller disconnected is
/// not cancelled or compensated.
pub async fn serve<F>(
    addr: SocketAddr,
    orchestrator: Arc<PipelineOrchestrator>,
    shutdown: F,
) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })?;

    let local_addr = listener.local_addr().unwrap_or(addr);
    info!(%local_addr, "HTTP trigger listening");

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ListenerError::Serve)?;

    info!("HTTP trigger stopped");
    Ok(())
}

mod routes;

pub use routes::{routes, MAX_BODY_BYTES};

use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::pipeline::ScoringPipeline;

/// Bind the prediction API to `addr`.
///
/// Returns the bound address (useful with port 0) and the server future,
/// which runs until Ctrl-C. Must be called inside a Tokio runtime.
pub fn bind(
    pipeline: ScoringPipeline,
    addr: SocketAddr,
) -> Result<(SocketAddr, impl Future<Output = ()>)> {
    let api = routes(Arc::new(pipeline));

    let (bound, server) = warp::serve(api)
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(address = %bound, "serving predictions");
    Ok((bound, server))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("artifacts");
        let pipeline =
            ScoringPipeline::load(&dir.join("scaler.json"), &dir.join("best_model.json")).unwrap();

        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let (bound, _server) = bind(pipeline, addr).unwrap();
        assert_ne!(bound.port(), 0);
        assert!(bound.ip().is_loopback());
    }
}

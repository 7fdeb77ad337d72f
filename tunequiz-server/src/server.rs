//! HTTP server lifecycle.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::{AppState, build_router};

/// Handle to a running HTTP server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    join_handle: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    /// Address the server is bound to (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            // receiver gone means the server already exited
            let _ = tx.send(());
        }
        self.join_handle
            .await
            .context("Server task panicked")?
            .context("Server terminated with an error")?;
        info!("HTTP server stopped");
        Ok(())
    }
}

/// Bind `addr` and serve the API in a background task.
pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<ServerHandle> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let local_addr = listener.local_addr().context("Failed to read bound address")?;

    info!("Listening on http://{}", local_addr);

    let (tx, rx) = oneshot::channel::<()>();
    let app = build_router(state);

    let join_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
                debug!("Server shutdown signal received");
            })
            .await
    });

    Ok(ServerHandle {
        local_addr,
        shutdown: Some(tx),
        join_handle,
    })
}

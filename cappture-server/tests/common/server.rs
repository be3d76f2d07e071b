//! Test server harness for integration tests.
//!
//! Spins up the real router on a random port so tests can talk to it over
//! HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use cappture_server::{app, AppState, EdgeAgent, AGENT_PROCESS_PATH};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A test server instance with control handles.
pub struct TestServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server whose agent replies without delay.
    pub async fn start() -> Self {
        Self::with_delay(Duration::ZERO).await
    }

    /// Start a server whose agent waits `delay` before replying.
    ///
    /// # Panics
    ///
    /// Panics if no port is available or server fails to bind.
    pub async fn with_delay(delay: Duration) -> Self {
        let port = portpicker::pick_unused_port().expect("no available port");
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let router = app(AppState::new(EdgeAgent::new(delay)));

        let listener = TcpListener::bind(addr).await.expect("failed to bind");
        let actual_addr = listener.local_addr().expect("failed to get local addr");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("server error");
        });

        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        Self {
            addr: actual_addr,
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    /// URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// The agent-process endpoint URL.
    pub fn agent_url(&self) -> String {
        self.url(AGENT_PROCESS_PATH)
    }

    /// Gracefully shut down the server.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

//! HTTP surface: catalog discovery and tool invocation.

use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

use crate::bus::Bus;
use crate::engine::SharedEngine;
use crate::error::{CoreError, CoreResult};
use crate::tools::{Dispatcher, ToolRegistry};

pub mod catalog;
pub mod invoke;
pub mod openapi;

pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

pub(crate) struct ServerState {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) registry: Arc<ToolRegistry>,
}

impl Server {
    /// Bind the listener and start serving in a background task.
    pub async fn start(
        listen: &str,
        registry: Arc<ToolRegistry>,
        engine: SharedEngine,
        bus: Bus,
    ) -> CoreResult<Self> {
        let dispatcher = Dispatcher::new(registry.clone(), engine, bus);
        let state = Arc::new(ServerState { dispatcher, registry });

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        let app = Router::new()
            .route("/health", get(health))
            .route("/tools", get(catalog::list_tools))
            .route("/invoke", post(invoke::invoke_tool))
            .with_state(state)
            .layer(cors);

        let listener = TcpListener::bind(listen)
            .await
            .map_err(|err| CoreError::Internal(format!("failed to bind {listen}: {err}")))?;
        let addr = listener
            .local_addr()
            .map_err(|err| CoreError::Internal(format!("failed to read local addr: {err}")))?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&mut self) -> CoreResult<()> {
        if let Some(sender) = self.shutdown.take() {
            sender
                .send(())
                .map_err(|_| CoreError::Internal("failed to send shutdown signal".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::register_all;
    use crate::engine::StubEngine;

    async fn start_test_server() -> Server {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry).unwrap();
        Server::start(
            "127.0.0.1:0",
            Arc::new(registry),
            Arc::new(StubEngine::new()),
            Bus::new(16),
        )
        .await
        .expect("start")
    }

    #[tokio::test]
    async fn start_binds_random_port() {
        let mut server = start_test_server().await;
        assert_ne!(server.addr().port(), 0);
        server.shutdown().expect("shutdown");
    }

    #[tokio::test]
    async fn shutdown_twice_is_harmless() {
        let mut server = start_test_server().await;
        server.shutdown().expect("first");
        server.shutdown().expect("second");
    }
}

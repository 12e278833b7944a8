//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::net::SocketAddr;

use crate::api::build_router;
use crate::core::{Config, Result, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// 监听 `HTTP_PORT`，直到收到 Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("☕ Cafe Server listening on {}", addr);

        let app = build_router(self.state.clone());
        let shutdown = self.state.shutdown.clone();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
                // WebSocket 会话不会自行结束
                shutdown.cancel();
            })
            .await?;

        self.state.db.pool.close().await;
        tracing::info!("Server stopped");
        Ok(())
    }
}

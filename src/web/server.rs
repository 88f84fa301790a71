//! HTTP server for the module-formation skill
//!
//! Provides an HTTP server using Axum that exposes the request/response
//! surface as a JSON API. All handlers share one [`SharedRegistry`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::registry::SharedRegistry;

use super::routes;

/// Shared application state
pub struct AppState {
    pub registry: SharedRegistry,
}

/// Configuration for the web server
pub struct ServerConfig {
    pub port: u16,
    /// Bind on all interfaces instead of loopback only
    pub public: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            public: false,
        }
    }
}

/// Build the application router
pub fn app(registry: SharedRegistry) -> Router {
    let state = Arc::new(AppState { registry });

    Router::new()
        .merge(routes::api_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server and serve until interrupted
pub async fn start_server(
    registry: SharedRegistry,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ip = if config.public {
        [0, 0, 0, 0]
    } else {
        [127, 0, 0, 1]
    };
    let addr = SocketAddr::from((ip, config.port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "listening");
    eprintln!("Serving module formation API at http://{}", addr);
    eprintln!("Press Ctrl+C to stop the server");

    axum::serve(listener, app(registry)).await?;

    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::{middleware, Router};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers::{
    create_record, delete_record, get_address, get_stats, health_check, list_records,
    update_address, AppState, SharedState,
};
use crate::middleware::logging_middleware;
use crate::store::KeyValueStore;

/// Builds the service router over any store implementation. Split from
/// `Server` so tests can drive the router in-process.
pub fn create_app(store: Arc<dyn KeyValueStore>) -> Router {
    let state: SharedState = Arc::new(AppState { store });

    Router::new()
        // Record resources
        .route("/phones", post(create_record))
        .route("/phones/:phone", get(get_address))
        .route("/phones/:phone", put(update_address))
        .route("/phones/:phone", delete(delete_record))
        // Administrative endpoints
        .route("/admin/records", get(list_records))
        .route("/admin/stats", get(get_stats))
        // Liveness
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(logging_middleware)),
        )
}

pub struct Server {
    app: Router,
    bind_addr: SocketAddr,
}

impl Server {
    /// The store handle is built by the composition root (`main`) so its
    /// lifecycle stays outside the router.
    pub fn new(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            app: create_app(store),
            bind_addr: config.bind_addr,
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;

        tracing::info!("Phone-address service listening on {}", self.bind_addr);
        tracing::info!("Health check available at /health");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}

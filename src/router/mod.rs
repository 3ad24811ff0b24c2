//! Routing module for the storefront cart service

pub mod cart;
pub mod state;

pub use state::{AppState, SharedState};

use axum::{body::Body, extract::Request, middleware::Next, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    // Middleware: Log requests
    let log_layer = axum::middleware::from_fn(|req: Request<Body>, next: Next| async move {
        info!(method = %req.method(), uri = %req.uri(), "request");
        let res = next.run(req).await;
        if !res.status().is_success() {
            warn!(status = %res.status(), "request completed with error status");
        }
        res
    });

    // Middleware: CORS (Permissive for local dev)
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes
    Router::new()
        .merge(cart::routes())
        .layer(log_layer)
        .layer(cors_layer)
        .with_state(state)
}

//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store wiring shared by handlers
//! - `guards.rs`: id and body guards run before handlers
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: typed request inputs and small response bodies
//! - `errors.rs`: the `{ errorMessage }` error contract

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod guards;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: services::AppServices, config: AppConfig) -> Router {
    let router = Router::new()
        .route("/", get(routes::system::index))
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(Arc::new(services)))
        .layer(Extension(Arc::new(config)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::log_request)),
        );

    middleware::with_security_headers(router)
}

//! HTTP API: server, routing, guards and request/response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;

pub use app::build_app;
pub use config::AppConfig;

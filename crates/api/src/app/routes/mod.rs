use axum::Router;

pub mod posts;
pub mod system;
pub mod users;

/// Router for the resource endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/users", users::router())
        .nest("/posts", posts::router())
}

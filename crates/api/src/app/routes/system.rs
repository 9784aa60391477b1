use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::Html};

use crate::config::AppConfig;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Landing page.
pub async fn index(Extension(config): Extension<Arc<AppConfig>>) -> Html<String> {
    Html(greeting(&config.greeting_name))
}

pub fn greeting(name: &str) -> String {
    let name = name.trim();
    let name_insert = if name.is_empty() {
        String::new()
    } else {
        format!(" {name}")
    };
    format!("<h2>Lambda Hubs API</h2>\n<p>Welcome{name_insert} to the Lambda Hubs API</p>\n")
}

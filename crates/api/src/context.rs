//! Per-request context produced by guards.
//!
//! Handlers receive guard output as typed extractor values instead of reading
//! ad-hoc request state. axum runs extractors left to right, each one fully
//! completing before the next; the first rejection is the response.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};

use crate::app::errors::ApiError;
use crate::app::guards::{parse_body, validate_body, validate_entity_id, RequiredFields, Resource};
use crate::app::services::AppServices;

/// The entity named by the `:id` path segment, verified to exist.
///
/// `raw_id` is the segment exactly as the client sent it. Messages that echo
/// the id use it rather than the entity's canonical id.
#[derive(Debug, Clone)]
pub struct Resolved<R> {
    pub entity: R,
    pub raw_id: String,
}

#[async_trait]
impl<S, R> FromRequestParts<S> for Resolved<R>
where
    S: Send + Sync,
    R: Resource,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let services = services_from(parts)?;
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request(format!("Invalid {} ID", R::KIND)))?;

        let entity = validate_entity_id::<R>(&services, &raw_id).await?;
        Ok(Self { entity, raw_id })
    }
}

/// A request body that passed [`validate_body`] for `T::REQUIRED`.
///
/// Consumes the body, so it must be the last handler argument.
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: RequiredFields + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // An unreadable body is treated like an empty one.
        let bytes = Bytes::from_request(req, state).await.unwrap_or_default();
        let body = parse_body(&bytes);
        let fields = validate_body(&body, T::REQUIRED)?;
        T::from_fields(fields).map(Self)
    }
}

fn services_from(parts: &Parts) -> Result<Arc<AppServices>, ApiError> {
    parts
        .extensions
        .get::<Arc<AppServices>>()
        .cloned()
        .ok_or_else(|| {
            tracing::error!("AppServices extension missing from router");
            ApiError::internal("Service unavailable")
        })
}

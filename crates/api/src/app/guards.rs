//! Request guards.
//!
//! A guard either hands the next stage a value or ends the request with an
//! [`ApiError`]; it never does both. Two guards exist:
//!
//! - [`validate_entity_id`] resolves the `:id` path segment to a stored entity.
//! - [`validate_body`] checks that required fields are present and narrows the
//!   body to exactly those fields.
//!
//! The axum extractors in [`crate::context`] run these in handler-argument order.

use async_trait::async_trait;
use serde_json::{Map, Value};

use hubs_core::{Entity, PostId, UserId};
use hubs_infra::StoreResult;
use hubs_posts::Post;
use hubs_users::User;

use crate::app::errors::{ApiError, EMPTY_FIELD};
use crate::app::services::AppServices;

/// An entity that can be resolved from a path id.
#[async_trait]
pub trait Resource: Entity + Sized + Send + 'static {
    /// Lower-case name used in error messages (`Invalid <kind> ID of #...`).
    const KIND: &'static str;

    fn parse_id(raw: &str) -> Option<Self::Id>;

    async fn lookup(services: &AppServices, id: Self::Id) -> StoreResult<Option<Self>>;
}

#[async_trait]
impl Resource for User {
    const KIND: &'static str = "user";

    fn parse_id(raw: &str) -> Option<UserId> {
        raw.parse().ok()
    }

    async fn lookup(services: &AppServices, id: UserId) -> StoreResult<Option<Self>> {
        services.users.get_by_id(id).await
    }
}

#[async_trait]
impl Resource for Post {
    const KIND: &'static str = "post";

    fn parse_id(raw: &str) -> Option<PostId> {
        raw.parse().ok()
    }

    async fn lookup(services: &AppServices, id: PostId) -> StoreResult<Option<Self>> {
        services.posts.get_by_id(id).await
    }
}

/// Resolve `raw_id` to an existing `R`.
///
/// Unparseable and unknown ids are the same client error (400). A failing
/// lookup is a server error (500).
pub async fn validate_entity_id<R: Resource>(
    services: &AppServices,
    raw_id: &str,
) -> Result<R, ApiError> {
    let invalid = || ApiError::bad_request(format!("Invalid {} ID of #{}", R::KIND, raw_id));

    let Some(id) = R::parse_id(raw_id) else {
        tracing::debug!(kind = R::KIND, raw_id, "rejected malformed id");
        return Err(invalid());
    };

    match R::lookup(services, id).await {
        Ok(Some(entity)) => Ok(entity),
        Ok(None) => {
            tracing::debug!(kind = R::KIND, %id, "rejected unknown id");
            Err(invalid())
        }
        Err(err) => Err(ApiError::store(
            err,
            format!("Could not look up {} #{}", R::KIND, raw_id),
        )),
    }
}

/// A body narrowed to its required fields. Every value is a non-blank string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fields(Map<String, Value>);

impl Fields {
    /// Remove and return the string stored under `key`.
    pub fn take(&mut self, key: &str) -> Result<String, ApiError> {
        match self.0.remove(key) {
            Some(Value::String(s)) => Ok(s),
            _ => Err(ApiError::bad_request(EMPTY_FIELD)),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

/// A typed route input built from a validated body.
pub trait RequiredFields: Sized {
    const REQUIRED: &'static [&'static str];

    fn from_fields(fields: Fields) -> Result<Self, ApiError>;
}

/// Check every field in `required` and return only those fields.
///
/// A field passes when it is a string with at least one non-whitespace
/// character. Anything else the client sent is dropped.
pub fn validate_body(body: &Value, required: &[&str]) -> Result<Fields, ApiError> {
    let mut fields = Map::new();
    for &key in required {
        match body.get(key) {
            Some(Value::String(s)) if hubs_core::error::is_present(s) => {
                fields.insert(key.to_string(), Value::String(s.clone()));
            }
            _ => {
                tracing::debug!(field = key, "rejected body with missing field");
                return Err(ApiError::bad_request(EMPTY_FIELD));
            }
        }
    }
    Ok(Fields(fields))
}

/// Parse a raw request body. Anything that is not a JSON object counts as `{}`.
pub fn parse_body(bytes: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::Object(Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use hubs_infra::{InMemoryStore, PostStore, StoreError, UserStore};
    use hubs_posts::{NewPost, PostChanges};
    use hubs_users::{NewUser, UserChanges};

    use super::*;

    /// Store whose every call fails.
    struct DownStore;

    #[async_trait]
    impl UserStore for DownStore {
        async fn insert(&self, _: NewUser) -> StoreResult<User> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn get(&self) -> StoreResult<Vec<User>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn get_by_id(&self, _: UserId) -> StoreResult<Option<User>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn update(&self, _: UserId, _: UserChanges) -> StoreResult<u64> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn remove(&self, _: UserId) -> StoreResult<u64> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn get_user_posts(&self, _: UserId) -> StoreResult<Vec<Post>> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[async_trait]
    impl PostStore for DownStore {
        async fn insert(&self, _: NewPost) -> StoreResult<Post> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn get(&self) -> StoreResult<Vec<Post>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn get_by_id(&self, _: PostId) -> StoreResult<Option<Post>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn update(&self, _: PostId, _: PostChanges) -> StoreResult<u64> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn remove(&self, _: PostId) -> StoreResult<u64> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    fn down_services() -> AppServices {
        let store = Arc::new(DownStore);
        AppServices::new(store.clone(), store)
    }

    #[tokio::test]
    async fn existing_user_is_resolved() {
        let store = Arc::new(InMemoryStore::new());
        let services = AppServices::new(store.clone(), store.clone());
        let user = UserStore::insert(&*store, NewUser::new("Asha").unwrap())
            .await
            .unwrap();

        let resolved: User = validate_entity_id(&services, &user.id_typed().to_string())
            .await
            .unwrap();
        assert_eq!(resolved, user);
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_are_client_errors() {
        let services = AppServices::in_memory();
        let missing = UserId::new().to_string();

        let err = validate_entity_id::<User>(&services, &missing).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), format!("Invalid user ID of #{missing}"));

        let err = validate_entity_id::<Post>(&services, "42").await.unwrap_err();
        assert_eq!(err, ApiError::bad_request("Invalid post ID of #42"));
    }

    #[tokio::test]
    async fn failing_lookup_is_a_server_error() {
        let services = down_services();
        let id = UserId::new().to_string();

        let err = validate_entity_id::<User>(&services, &id).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), format!("Could not look up user #{id}"));
    }

    #[tokio::test]
    async fn malformed_id_skips_the_store() {
        // DownStore would turn a lookup into a 500.
        let err = validate_entity_id::<User>(&down_services(), "not-an-id")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn body_is_narrowed_to_required_fields() {
        let body = json!({ "name": "Asha", "admin": true, "id": "spoofed" });
        let fields = validate_body(&body, &["name"]).unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains("name"));
        assert!(!fields.contains("admin"));
    }

    #[test]
    fn missing_blank_or_non_string_fields_are_rejected() {
        for body in [
            json!({}),
            json!({ "name": "" }),
            json!({ "name": "   " }),
            json!({ "name": null }),
            json!({ "name": 7 }),
            json!({ "nmae": "typo" }),
        ] {
            let err = validate_body(&body, &["name"]).unwrap_err();
            assert_eq!(err, ApiError::bad_request("Cannot be empty"), "body: {body}");
        }
    }

    #[test]
    fn every_required_field_is_checked() {
        let body = json!({ "text": "hi" });
        assert!(validate_body(&body, &["text", "title"]).is_err());
        assert!(validate_body(&body, &[]).unwrap().is_empty());
    }

    #[test]
    fn non_object_bodies_parse_as_empty() {
        assert_eq!(parse_body(b""), json!({}));
        assert_eq!(parse_body(b"not json"), json!({}));
        assert_eq!(parse_body(b"[1,2]"), json!({}));
        assert_eq!(parse_body(br#"{"name":"Asha"}"#), json!({ "name": "Asha" }));
    }

    #[test]
    fn take_moves_the_value_out() {
        let mut fields = validate_body(&json!({ "text": "hello" }), &["text"]).unwrap();
        assert_eq!(fields.take("text").unwrap(), "hello");
        assert!(fields.take("text").is_err());
    }
}

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use hubs_posts::{NewPost, Post};
use hubs_users::{NewUser, User, UserChanges};

use crate::app::dto::{MessageResponse, PostInput, UserInput};
use crate::app::errors::ApiError;
use crate::app::routes::posts;
use crate::app::services::AppServices;
use crate::context::{Resolved, Validated};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/posts", get(list_user_posts).post(create_user_post))
        .layer(CorsLayer::permissive())
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Validated(input): Validated<UserInput>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let new_user = NewUser::new(input.name)?;
    let user = services
        .users
        .insert(new_user)
        .await
        .map_err(|e| ApiError::store(e, "Could not add this user, sorry"))?;

    tracing::info!(user_id = %user.id_typed(), "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = services
        .users
        .get()
        .await
        .map_err(|e| ApiError::store(e, "Cannot"))?;
    Ok(Json(users))
}

pub async fn get_user(Resolved { entity: user, .. }: Resolved<User>) -> Json<User> {
    Json(user)
}

/// Replace the user's name, then answer with the stored record.
///
/// A zero update count means the user vanished between the id check and the
/// write; that is reported as 404.
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Resolved { entity: user, raw_id }: Resolved<User>,
    Validated(input): Validated<UserInput>,
) -> Result<Json<User>, ApiError> {
    let id = user.id_typed();
    let changes = UserChanges::new(input.name)?;

    let updated = services
        .users
        .update(id, changes)
        .await
        .map_err(|e| ApiError::store(e, "Could not update this user"))?;
    if updated == 0 {
        return Err(gone(&raw_id));
    }

    match services.users.get_by_id(id).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => Err(gone(&raw_id)),
        Err(e) => Err(ApiError::store(e, "Could not get user")),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Resolved { entity: user, raw_id }: Resolved<User>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = user.id_typed();
    let removed = services
        .users
        .remove(id)
        .await
        .map_err(|e| ApiError::store(e, format!("Cannot change #{raw_id}")))?;

    tracing::info!(user_id = %id, removed, "user removed");
    Ok(Json(MessageResponse::new(format!("ID #{raw_id} is out"))))
}

/// A user without posts is answered with 400, not an empty list.
pub async fn list_user_posts(
    Extension(services): Extension<Arc<AppServices>>,
    Resolved { entity: user, raw_id }: Resolved<User>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = services
        .users
        .get_user_posts(user.id_typed())
        .await
        .map_err(|e| ApiError::store(e, format!("ID #{raw_id} does not have any comments")))?;

    if posts.is_empty() {
        return Err(ApiError::bad_request(format!(
            "Sorry, User {raw_id} has no posts yet"
        )));
    }
    Ok(Json(posts))
}

pub async fn create_user_post(
    Extension(services): Extension<Arc<AppServices>>,
    Resolved { entity: user, .. }: Resolved<User>,
    Validated(input): Validated<PostInput>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let new_post = NewPost::new(user.id_typed(), input.text)?;
    let post = posts::insert_post(&services, new_post)
        .await
        .map_err(|e| ApiError::store(e, "No posts for you"))?;

    Ok((StatusCode::CREATED, Json(post)))
}

fn gone(id: &str) -> ApiError {
    ApiError::not_found(format!("User #{id} no longer exists"))
}

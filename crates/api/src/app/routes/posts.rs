use std::sync::Arc;

use axum::{extract::Extension, routing::get, Json, Router};

use hubs_infra::StoreResult;
use hubs_posts::{NewPost, Post, PostChanges};

use crate::app::dto::{MessageResponse, PostInput};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::{Resolved, Validated};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_posts))
        .route("/:id", get(get_post).put(update_post).delete(delete_post))
}

/// Store a post. The owner has already been verified by the caller.
pub async fn insert_post(services: &AppServices, post: NewPost) -> StoreResult<Post> {
    let post = services.posts.insert(post).await?;
    tracing::info!(post_id = %post.id_typed(), user_id = %post.user_id(), "post created");
    Ok(post)
}

pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = services
        .posts
        .get()
        .await
        .map_err(|e| ApiError::store(e, "Could not get posts"))?;
    Ok(Json(posts))
}

pub async fn get_post(Resolved { entity: post, .. }: Resolved<Post>) -> Json<Post> {
    Json(post)
}

pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    Resolved { entity: post, raw_id }: Resolved<Post>,
    Validated(input): Validated<PostInput>,
) -> Result<Json<Post>, ApiError> {
    let id = post.id_typed();
    let changes = PostChanges::new(input.text)?;

    let updated = services
        .posts
        .update(id, changes)
        .await
        .map_err(|e| ApiError::store(e, "Could not update this post"))?;
    if updated == 0 {
        return Err(gone(&raw_id));
    }

    match services.posts.get_by_id(id).await {
        Ok(Some(post)) => Ok(Json(post)),
        Ok(None) => Err(gone(&raw_id)),
        Err(e) => Err(ApiError::store(e, "Could not get post")),
    }
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Resolved { entity: post, raw_id }: Resolved<Post>,
) -> Result<Json<MessageResponse>, ApiError> {
    services
        .posts
        .remove(post.id_typed())
        .await
        .map_err(|e| ApiError::store(e, format!("Cannot remove post #{raw_id}")))?;
    Ok(Json(MessageResponse::new(format!("Post #{raw_id} is out"))))
}

fn gone(id: &str) -> ApiError {
    ApiError::not_found(format!("Post #{id} no longer exists"))
}

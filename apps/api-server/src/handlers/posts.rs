//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{Post, PostChanges};
use quill_core::ports::{BaseRepository, PostRepository};
use quill_shared::MessageResponse;
use quill_shared::dto::{CreatePostRequest, ListPostsQuery, UpdatePostRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// An id that is not a UUID cannot name an existing post.
fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Post not found".to_string()))
}

/// GET /posts?tag=T
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let tag = query.tag.as_deref().filter(|t| !t.is_empty());
    let posts = state.posts.list(tag).await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "Post",
            id,
        })?;

    Ok(HttpResponse::Ok().json(post))
}

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = Post::create(
        req.title.unwrap_or_default(),
        req.content.unwrap_or_default(),
        req.tags.unwrap_or_default(),
    )?;
    let saved = state.posts.insert(post).await?;

    tracing::info!(post_id = %saved.id, "Post created");
    Ok(HttpResponse::Created().json(MessageResponse::new("Post created")))
}

/// PATCH /posts/{id}
///
/// Only the fields present in the body are overwritten; they are not
/// re-validated.
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let req = body.into_inner();

    let changes = PostChanges {
        title: req.title,
        content: req.content,
        tags: req.tags,
    };
    state.posts.update(id, changes).await?;

    tracing::info!(post_id = %id, "Post updated");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post updated")))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    state.posts.delete(id).await?;

    tracing::info!(post_id = %id, "Post deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted")))
}

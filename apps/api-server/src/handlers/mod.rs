//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::{Scope, error::JsonPayloadError, web};

use crate::middleware::error::AppError;

/// Configure all application routes.
///
/// Post routes are served both at `/posts` and `/api/posts`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let detail = match &err {
            JsonPayloadError::ContentType => "Expected a JSON body".to_string(),
            other => other.to_string(),
        };
        AppError::BadRequest(detail).into()
    }))
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(posts_scope()),
    )
    .service(posts_scope());
}

fn posts_scope() -> Scope {
    web::scope("/posts")
        .route("", web::get().to(posts::list_posts))
        .route("", web::post().to(posts::create_post))
        .route("/{id}", web::get().to(posts::get_post))
        .route("/{id}", web::patch().to(posts::update_post))
        .route("/{id}", web::delete().to(posts::delete_post))
}

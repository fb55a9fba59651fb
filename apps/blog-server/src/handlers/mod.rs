//! HTTP handlers and route configuration.

#[cfg(feature = "auth")]
mod admin;
mod blog;
mod health;
mod home;

use actix_web::{Scope, web};

use crate::middleware::rate_limit::RateLimitMiddleware;

fn blog_scope() -> Scope {
    web::scope("/blog")
        .route("/", web::get().to(blog::post_list))
        .route("/search/", web::get().to(blog::post_search))
        .route("/tag/{tag_slug}/", web::get().to(blog::post_list_by_tag))
        .route("/{post_id}/share/", web::get().to(blog::post_share))
        .route("/{post_id}/share/", web::post().to(blog::post_share_send))
        .route("/{year}/{month}/{day}/{slug}/", web::get().to(blog::post_detail))
        .route("/{year}/{month}/{day}/{slug}/", web::post().to(blog::post_comment))
}

/// Configure all application routes. `limiter` throttles form submissions
/// under `/blog`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Option<RateLimitMiddleware>) {
    cfg.route("/", web::get().to(home::home))
        .route("/health", web::get().to(health::health_check));

    match limiter {
        Some(limiter) => {
            cfg.service(blog_scope().wrap(limiter));
        }
        None => {
            cfg.service(blog_scope());
        }
    }

    #[cfg(feature = "auth")]
    admin::configure(cfg);
}

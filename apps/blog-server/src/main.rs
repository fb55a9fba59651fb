//! # Inkpost Blog Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

#[cfg(feature = "auth")]
mod bootstrap;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;
mod views;

use config::AppConfig;
use middleware::rate_limit::{ClientAddr, RateLimitMiddleware};
use middleware::request_id::RequestIdHeader;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Inkpost blog server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(config.database.as_ref(), config.blog.clone()).await;
    let limiter = build_rate_limiter(ClientAddr::from_trust(config.trust_proxy_headers));

    #[cfg(feature = "auth")]
    let (token_service, password_service) = {
        use inkpost_core::ports::{PasswordService, TokenService};
        use inkpost_infra::{Argon2PasswordService, JwtTokenService};
        use std::sync::Arc;

        let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
        let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        match &config.admin {
            Some(account) => {
                if let Err(e) =
                    bootstrap::ensure_admin(&state, password_service.as_ref(), account).await
                {
                    tracing::error!("Failed to create admin account: {:#}", e);
                }
            }
            None => tracing::warn!("ADMIN_USERNAME/ADMIN_EMAIL/ADMIN_PASSWORD not set"),
        }

        (token_service, password_service)
    };

    HttpServer::new(move || {
        let app = App::new()
            .wrap(RequestIdHeader)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()));

        #[cfg(feature = "auth")]
        let app = app
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(password_service.clone()));

        let limiter = limiter.clone();
        app.configure(move |cfg| handlers::configure_routes(cfg, limiter))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(feature = "rate-limit")]
fn build_rate_limiter(client: ClientAddr) -> Option<RateLimitMiddleware> {
    use inkpost_infra::{InMemoryRateLimiter, RateLimitConfig};
    use std::sync::Arc;

    let config = RateLimitConfig::from_env();
    match InMemoryRateLimiter::new(config.clone()) {
        Ok(limiter) => {
            tracing::info!(
                max_requests = config.max_requests,
                window_secs = config.window.as_secs(),
                client = ?client,
                "Form rate limiting enabled"
            );
            Some(RateLimitMiddleware::new(Arc::new(limiter), client))
        }
        Err(e) => {
            tracing::error!("Invalid rate limit configuration: {}. Rate limiting disabled.", e);
            None
        }
    }
}

#[cfg(not(feature = "rate-limit"))]
fn build_rate_limiter(_client: ClientAddr) -> Option<RateLimitMiddleware> {
    None
}

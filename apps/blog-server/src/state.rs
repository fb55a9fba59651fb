//! Application state - shared across all handlers.

use std::sync::Arc;

use inkpost_core::ports::{
    CommentRepository, Mailer, PostRepository, TagRepository, UserRepository,
};
use inkpost_infra::{ConsoleMailer, DatabaseConfig, InMemoryBlogStore};

#[cfg(feature = "postgres")]
use inkpost_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use inkpost_infra::database::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};

use crate::config::BlogSettings;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub users: Arc<dyn UserRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub blog: BlogSettings,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>, blog: BlogSettings) -> Self {
        let mailer = build_mailer();

        #[cfg(feature = "postgres")]
        {
            if let Some(config) = db_config {
                match DatabaseConnections::init(config).await {
                    Ok(connections) => {
                        let db = connections.main;
                        tracing::info!("Application state initialized (postgres)");
                        return Self {
                            posts: Arc::new(PostgresPostRepository::new(db.clone())),
                            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
                            tags: Arc::new(PostgresTagRepository::new(db.clone())),
                            users: Arc::new(PostgresUserRepository::new(db)),
                            mailer,
                            blog,
                        };
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using in-memory store");
        }

        tracing::info!("Application state initialized (in-memory)");
        Self::in_memory(Arc::new(InMemoryBlogStore::new()), mailer, blog)
    }

    /// State backed by one in-memory store.
    pub fn in_memory(
        store: Arc<InMemoryBlogStore>,
        mailer: Arc<dyn Mailer>,
        blog: BlogSettings,
    ) -> Self {
        Self {
            posts: store.clone(),
            comments: store.clone(),
            tags: store.clone(),
            users: store,
            mailer,
            blog,
        }
    }
}

#[cfg(feature = "smtp")]
fn build_mailer() -> Arc<dyn Mailer> {
    use inkpost_infra::{SmtpConfig, SmtpMailer};

    match SmtpConfig::from_env() {
        Some(config) => match SmtpMailer::new(&config) {
            Ok(mailer) => {
                tracing::info!(host = %config.host, port = config.port, "SMTP mailer configured");
                return Arc::new(mailer);
            }
            Err(e) => {
                tracing::error!("Failed to configure SMTP: {}. Using console mailer.", e);
            }
        },
        None => tracing::warn!("SMTP_HOST not set. Emails are written to the log."),
    }
    Arc::new(ConsoleMailer)
}

#[cfg(not(feature = "smtp"))]
fn build_mailer() -> Arc<dyn Mailer> {
    Arc::new(ConsoleMailer)
}

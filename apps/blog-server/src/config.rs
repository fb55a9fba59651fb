//! Application configuration loaded from environment variables.

use std::env;

use inkpost_core::search::DEFAULT_SIMILARITY_THRESHOLD;
use inkpost_core::share::DEFAULT_SENDER;
use inkpost_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub blog: BlogSettings,
    pub admin: Option<AdminAccount>,
    /// Take the client address from `Forwarded`/`X-Forwarded-For`. Only safe
    /// behind a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

/// Settings of the public blog pages.
#[derive(Debug, Clone)]
pub struct BlogSettings {
    /// Posts per listing page.
    pub posts_per_page: u64,
    /// Minimum title similarity for search hits (exclusive).
    pub search_threshold: f64,
    /// Sender of recommendation emails.
    pub mail_from: String,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            posts_per_page: 5,
            search_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            mail_from: DEFAULT_SENDER.to_string(),
        }
    }
}

impl BlogSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            posts_per_page: env::var("POSTS_PER_PAGE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.posts_per_page),
            search_threshold: env::var("SEARCH_SIMILARITY_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.search_threshold),
            mail_from: env::var("MAIL_FROM")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.mail_from),
        }
    }
}

/// Staff account created at startup when it does not exist yet.
#[derive(Clone)]
pub struct AdminAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl AdminAccount {
    /// Read `ADMIN_USERNAME`, `ADMIN_EMAIL` and `ADMIN_PASSWORD`; all three are required.
    pub fn from_env() -> Option<Self> {
        let var = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            username: var("ADMIN_USERNAME")?,
            email: var("ADMIN_EMAIL")?,
            password: var("ADMIN_PASSWORD")?,
        })
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database: DatabaseConfig::from_env(),
            blog: BlogSettings::from_env(),
            admin: AdminAccount::from_env(),
            trust_proxy_headers: env::var("TRUST_PROXY_HEADERS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

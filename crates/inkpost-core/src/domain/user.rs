use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - a post author. Staff users may use the admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: String, email: String, password_hash: String, is_staff: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            is_staff,
            created_at: now,
            updated_at: now,
        }
    }

    /// Roles carried in access tokens issued for this user.
    pub fn roles(&self) -> Vec<String> {
        if self.is_staff {
            vec!["staff".to_string()]
        } else {
            Vec::new()
        }
    }
}

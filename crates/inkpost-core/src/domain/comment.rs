use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reader feedback attached to a post.
///
/// Comments are moderated through `active` rather than deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub active: bool,
}

impl Comment {
    /// Show or hide the comment.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.updated = Utc::now();
    }
}

/// A comment that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
    pub created: DateTime<Utc>,
    pub active: bool,
}

impl NewComment {
    pub fn new(post_id: i64, name: String, email: String, body: String) -> Self {
        Self {
            post_id,
            name,
            email,
            body,
            created: Utc::now(),
            active: true,
        }
    }
}

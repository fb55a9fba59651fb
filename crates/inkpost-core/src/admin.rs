//! Admin listing queries: filters, free-text search and ordering for the
//! post and comment back office.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Comment, Post, PostStatus};

/// Page size of admin listings.
pub const ADMIN_PAGE_SIZE: u64 = 100;

/// Inclusive-exclusive time window; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| *at >= from) && self.to.is_none_or(|to| *at < to)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Post admin listing: filter by status, author and dates, search title and body.
#[derive(Debug, Clone, Default)]
pub struct PostAdminQuery {
    pub status: Option<PostStatus>,
    pub author_id: Option<Uuid>,
    pub created: DateRange,
    pub publish: DateRange,
    pub search: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

impl PostAdminQuery {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.status.is_none_or(|s| post.status == s)
            && self.author_id.is_none_or(|a| post.author_id == a)
            && self.created.contains(&post.created)
            && self.publish.contains(&post.publish)
            && self
                .search_term()
                .is_none_or(|q| contains_ci(&post.title, q) || contains_ci(&post.body, q))
    }

    /// Admin ordering: status, then publish time ascending.
    pub fn ordering(a: &Post, b: &Post) -> Ordering {
        a.status
            .as_str()
            .cmp(b.status.as_str())
            .then_with(|| a.publish.cmp(&b.publish))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Comment admin listing: filter by moderation state, post and dates,
/// search name, email and body.
#[derive(Debug, Clone, Default)]
pub struct CommentAdminQuery {
    pub active: Option<bool>,
    pub post_id: Option<i64>,
    pub created: DateRange,
    pub updated: DateRange,
    pub search: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

impl CommentAdminQuery {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        self.active.is_none_or(|a| comment.active == a)
            && self.post_id.is_none_or(|p| comment.post_id == p)
            && self.created.contains(&comment.created)
            && self.updated.contains(&comment.updated)
            && self.search_term().is_none_or(|q| {
                contains_ci(&comment.name, q)
                    || contains_ci(&comment.email, q)
                    || contains_ci(&comment.body, q)
            })
    }
}

/// One page of an admin listing plus the unpaginated total.
#[derive(Debug, Clone)]
pub struct AdminPage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

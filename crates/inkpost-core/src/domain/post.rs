use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tag;
use crate::error::DomainError;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(DomainError::Validation(format!(
                "unknown post status '{other}'"
            ))),
        }
    }
}

/// Post entity - a blog article.
///
/// The slug is unique per publish date (UTC), not globally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub author_id: Uuid,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub status: PostStatus,
    pub tags: Vec<Tag>,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Calendar date the slug is scoped to.
    pub fn publish_date(&self) -> NaiveDate {
        self.publish.date_naive()
    }

    /// Site-relative URL of the detail page.
    pub fn absolute_url(&self) -> String {
        format!(
            "/blog/{}/{}/{}/{}/",
            self.publish.year(),
            self.publish.month(),
            self.publish.day(),
            self.slug
        )
    }

    pub fn share_url(&self) -> String {
        format!("/blog/{}/share/", self.id)
    }

    /// First `words` words of the body, with an ellipsis when cut.
    pub fn excerpt(&self, words: usize) -> String {
        let mut parts = self.body.split_whitespace();
        let head: Vec<&str> = parts.by_ref().take(words).collect();
        let mut excerpt = head.join(" ");
        if parts.next().is_some() {
            excerpt.push_str(" ...");
        }
        excerpt
    }
}

/// A post that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub author_id: Uuid,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub status: PostStatus,
    pub created: DateTime<Utc>,
}

impl NewPost {
    /// Create a draft published "now"; the slug falls back to the slugified title.
    pub fn new(author_id: Uuid, title: String, slug: Option<String>, body: String) -> Self {
        let now = Utc::now();
        let slug = slug
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| crate::slug::slugify(&title));
        Self {
            title,
            slug,
            author_id,
            body,
            publish: now,
            status: PostStatus::Draft,
            created: now,
        }
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn published_at(mut self, publish: DateTime<Utc>) -> Self {
        self.publish = publish;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(body: &str) -> Post {
        let publish = Utc.with_ymd_and_hms(2024, 3, 5, 22, 30, 0).unwrap();
        Post {
            id: 7,
            title: "Who was Django Reinhardt?".to_string(),
            slug: "who-was-django-reinhardt".to_string(),
            author_id: Uuid::new_v4(),
            body: body.to_string(),
            publish,
            created: publish,
            updated: publish,
            status: PostStatus::Published,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_absolute_url_uses_unpadded_date_parts() {
        let post = sample("body");
        assert_eq!(
            post.absolute_url(),
            "/blog/2024/3/5/who-was-django-reinhardt/"
        );
        assert_eq!(post.share_url(), "/blog/7/share/");
    }

    #[test]
    fn test_excerpt_truncates_on_words() {
        let post = sample("one two three four");
        assert_eq!(post.excerpt(2), "one two ...");
        assert_eq!(post.excerpt(4), "one two three four");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Published".parse::<PostStatus>().unwrap(), PostStatus::Published);
        assert_eq!("draft".parse::<PostStatus>().unwrap(), PostStatus::Draft);
        assert!("archived".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_new_post_prepopulates_slug_from_title() {
        let post = NewPost::new(Uuid::new_v4(), "Hello, World!".to_string(), None, String::new());
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.status, PostStatus::Draft);

        let post = NewPost::new(
            Uuid::new_v4(),
            "Hello".to_string(),
            Some("custom".to_string()),
            String::new(),
        );
        assert_eq!(post.slug, "custom");
    }
}

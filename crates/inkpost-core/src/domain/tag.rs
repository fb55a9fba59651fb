use serde::{Deserialize, Serialize};

use crate::slug::slugify_unicode;

/// A label attached to posts. The slug is unique and used in tag URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn url(&self) -> String {
        format!("/blog/tag/{}/", self.slug)
    }
}

/// A tag name paired with the slug it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagName {
    pub name: String,
    pub slug: String,
}

/// Resolve free-form tag names into distinct slugs.
///
/// Blank entries are skipped and later duplicates of a slug are dropped.
/// A name with no letters or digits is returned as the error.
pub fn parse_tag_names(names: &[String]) -> Result<Vec<TagName>, String> {
    let mut parsed: Vec<TagName> = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let slug = slugify_unicode(name);
        if slug.is_empty() {
            return Err(name.to_string());
        }
        if parsed.iter().all(|t| t.slug != slug) {
            parsed.push(TagName {
                name: name.to_string(),
                slug,
            });
        }
    }
    Ok(parsed)
}

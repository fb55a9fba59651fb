//! "Similar posts": published posts ranked by how many tags they share
//! with a given post.

use std::collections::HashSet;

use crate::domain::Post;

/// How many similar posts a detail page shows.
pub const SIMILAR_POSTS_LIMIT: usize = 4;

/// Rank `candidates` against `post`.
///
/// Keeps published posts other than `post` that share at least one tag,
/// ordered by shared-tag count then publish time, newest first.
pub fn rank_similar<I>(post: &Post, candidates: I, limit: usize) -> Vec<Post>
where
    I: IntoIterator<Item = Post>,
{
    let tag_ids: HashSet<i64> = post.tags.iter().map(|t| t.id).collect();
    if tag_ids.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, Post)> = candidates
        .into_iter()
        .filter(|candidate| candidate.id != post.id && candidate.is_published())
        .filter_map(|candidate| {
            let shared = candidate
                .tags
                .iter()
                .filter(|t| tag_ids.contains(&t.id))
                .count();
            (shared > 0).then_some((shared, candidate))
        })
        .collect();

    scored.sort_by(|(a_shared, a), (b_shared, b)| {
        b_shared
            .cmp(a_shared)
            .then_with(|| b.publish.cmp(&a.publish))
    });
    scored.truncate(limit);
    scored.into_iter().map(|(_, p)| p).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::{PostStatus, Tag};

    fn tag(id: i64) -> Tag {
        Tag {
            id,
            name: format!("tag{id}"),
            slug: format!("tag{id}"),
        }
    }

    fn post(id: i64, day: u32, tags: &[i64], status: PostStatus) -> Post {
        let publish = Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap();
        Post {
            id,
            title: format!("Post {id}"),
            slug: format!("post-{id}"),
            author_id: Uuid::nil(),
            body: String::new(),
            publish,
            created: publish,
            updated: publish,
            status,
            tags: tags.iter().copied().map(tag).collect(),
        }
    }

    #[test]
    fn test_orders_by_shared_tags_then_publish() {
        let current = post(1, 1, &[1, 2, 3], PostStatus::Published);
        let candidates = vec![
            current.clone(),
            post(2, 2, &[1], PostStatus::Published),
            post(3, 3, &[1, 2], PostStatus::Published),
            post(4, 4, &[2], PostStatus::Published),
            post(5, 5, &[9], PostStatus::Published),
        ];

        let ids: Vec<i64> = rank_similar(&current, candidates, SIMILAR_POSTS_LIMIT)
            .iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, vec![3, 4, 2]);
    }

    #[test]
    fn test_limits_results_and_skips_drafts() {
        let current = post(1, 1, &[1], PostStatus::Published);
        let mut candidates: Vec<Post> = (2..=8)
            .map(|id| post(id, id as u32, &[1], PostStatus::Published))
            .collect();
        candidates.push(post(20, 28, &[1], PostStatus::Draft));

        let similar = rank_similar(&current, candidates, SIMILAR_POSTS_LIMIT);

        assert_eq!(similar.len(), 4);
        assert!(similar.iter().all(|p| p.id != 20 && p.id != 1));
        assert_eq!(similar[0].id, 8);
    }

    #[test]
    fn test_untagged_post_has_no_similar_posts() {
        let current = post(1, 1, &[], PostStatus::Published);
        let candidates = vec![post(2, 2, &[1], PostStatus::Published)];
        assert!(rank_similar(&current, candidates, SIMILAR_POSTS_LIMIT).is_empty());
    }
}

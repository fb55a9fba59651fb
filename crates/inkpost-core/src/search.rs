//! Trigram similarity, following the semantics of PostgreSQL's `pg_trgm`.
//!
//! Text is lowercased and split into words of alphanumeric characters.
//! Each word is padded with two spaces in front and one behind, and every
//! three-character window becomes a trigram. Similarity is the size of the
//! intersection of both trigram sets divided by the size of their union.

use std::collections::HashSet;

use crate::domain::Post;

/// Titles scoring at or below this are not search results.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;

/// A post matched by a title search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub post: Post,
    pub similarity: f64,
}

/// Set of trigrams extracted from `text`.
pub fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let mut set = HashSet::new();
    let lowered = text.to_lowercase();

    for word in lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }

    set
}

/// Similarity of two strings in `0.0..=1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    overlap(&trigrams(a), &trigrams(b))
}

fn overlap(left: &HashSet<[char; 3]>, right: &HashSet<[char; 3]>) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.intersection(right).count();
    let union = left.len() + right.len() - shared;
    shared as f64 / union as f64
}

/// Score `posts` by title against `query`, keep those above `threshold`
/// and order by descending similarity.
pub fn rank_by_title<I>(posts: I, query: &str, threshold: f64) -> Vec<SearchHit>
where
    I: IntoIterator<Item = Post>,
{
    let query_trigrams = trigrams(query);
    let mut hits: Vec<SearchHit> = posts
        .into_iter()
        .filter_map(|post| {
            let similarity = overlap(&trigrams(&post.title), &query_trigrams);
            (similarity > threshold).then_some(SearchHit { post, similarity })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| b.post.publish.cmp(&a.post.publish))
    });
    hits
}


#[cfg(test)]
mod rank_tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::PostStatus;

    fn post(id: i64, title: &str) -> Post {
        let publish = Utc.with_ymd_and_hms(2024, 1, id as u32, 9, 0, 0).unwrap();
        Post {
            id,
            title: title.to_string(),
            slug: crate::slug::slugify(title),
            author_id: Uuid::nil(),
            body: String::new(),
            publish,
            created: publish,
            updated: publish,
            status: PostStatus::Published,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_rank_by_title_filters_and_orders() {
        let posts = vec![
            post(1, "Learning Rust"),
            post(2, "Rust"),
            post(3, "Gardening tips"),
        ];

        let hits = rank_by_title(posts, "rust", DEFAULT_SIMILARITY_THRESHOLD);
        let ids: Vec<i64> = hits.iter().map(|h| h.post.id).collect();

        assert_eq!(ids, vec![2, 1]);
        assert_eq!(hits[0].similarity, 1.0);
        assert!(hits[1].similarity > DEFAULT_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn test_rank_by_title_blank_query_matches_nothing() {
        let hits = rank_by_title(vec![post(1, "Rust")], "   ", DEFAULT_SIMILARITY_THRESHOLD);
        assert!(hits.is_empty());
    }
}

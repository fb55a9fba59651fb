use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::admin::{AdminPage, CommentAdminQuery, PostAdminQuery};
use crate::domain::{Comment, NewComment, NewPost, Post, Tag, User};
use crate::error::RepoError;
use crate::search::SearchHit;

/// Generic repository trait defining standard CRUD operations.
///
/// `N` is the unsaved form of `T`.
#[async_trait]
pub trait BaseRepository<T, N, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity and return it with its assigned ID.
    async fn create(&self, new: N) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User (author) repository.
#[async_trait]
pub trait UserRepository: BaseRepository<User, User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. Posts are returned with their tags loaded.
///
/// Every `*_published` method and `similar_posts` ignore drafts.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, NewPost, i64> {
    /// Number of published posts, optionally only those tagged `tag_id`.
    async fn count_published(&self, tag_id: Option<i64>) -> Result<u64, RepoError>;

    /// Published posts, newest first.
    async fn list_published(
        &self,
        tag_id: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    /// The published post with `slug` on publish date `date` (UTC).
    async fn find_published(&self, date: NaiveDate, slug: &str)
    -> Result<Option<Post>, RepoError>;

    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;

    /// Any post, whatever its status, using `slug` on `date`.
    async fn find_by_date_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError>;

    /// Published posts sharing tags with `post`, best matches first.
    async fn similar_posts(&self, post: &Post, limit: usize) -> Result<Vec<Post>, RepoError>;

    /// Posts of any status whose title is trigram-similar to `query` above `threshold`.
    async fn search_titles(&self, query: &str, threshold: f64)
    -> Result<Vec<SearchHit>, RepoError>;

    /// Insert `new` tagged with `tags` (names, created on demand) as one write.
    ///
    /// A tag name without letters or digits fails with `RepoError::Constraint`
    /// and nothing is stored.
    async fn create_with_tags(&self, new: NewPost, tags: &[String]) -> Result<Post, RepoError>;

    /// Persist `post` and replace its tags with `tags` as one write.
    async fn update_with_tags(&self, post: Post, tags: &[String]) -> Result<Post, RepoError>;

    async fn admin_list(&self, query: &PostAdminQuery) -> Result<AdminPage<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, NewComment, i64> {
    /// Active comments of a post, oldest first.
    async fn active_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;

    async fn admin_list(&self, query: &CommentAdminQuery)
    -> Result<AdminPage<Comment>, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    async fn list_all(&self) -> Result<Vec<Tag>, RepoError>;
}

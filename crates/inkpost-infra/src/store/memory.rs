//! In-memory blog store - used when no database is configured, and in tests.
//!
//! Implements every repository port over one set of tables guarded by an
//! async `RwLock`. Data is lost on process restart.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkpost_core::admin::{AdminPage, CommentAdminQuery, PostAdminQuery};
use inkpost_core::domain::{
    Comment, NewComment, NewPost, Post, Tag, TagName, User, parse_tag_names,
};
use inkpost_core::error::RepoError;
use inkpost_core::ports::{
    BaseRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};
use inkpost_core::search::{SearchHit, rank_by_title};
use inkpost_core::similar::rank_similar;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// Stored without tags; see `Tables::with_tags`.
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    tags: BTreeMap<i64, Tag>,
    /// (post_id, tag_id)
    post_tags: BTreeSet<(i64, i64)>,
    last_post_id: i64,
    last_comment_id: i64,
    last_tag_id: i64,
}

impl Tables {
    fn with_tags(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.tags = self
            .post_tags
            .range((post.id, i64::MIN)..=(post.id, i64::MAX))
            .filter_map(|(_, tag_id)| self.tags.get(tag_id).cloned())
            .collect();
        post
    }

    /// Published posts (optionally tagged `tag_id`), newest first.
    fn published(&self, tag_id: Option<i64>) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| p.is_published())
            .filter(|p| tag_id.is_none_or(|t| self.post_tags.contains(&(p.id, t))))
            .map(|p| self.with_tags(p))
            .collect();
        posts.sort_by(|a, b| b.publish.cmp(&a.publish).then_with(|| b.id.cmp(&a.id)));
        posts
    }

    fn slug_taken(&self, date: NaiveDate, slug: &str, except: Option<i64>) -> bool {
        self.posts.values().any(|p| {
            Some(p.id) != except && p.slug == slug && p.publish_date() == date
        })
    }

    fn insert_post(&mut self, new: NewPost) -> Result<Post, RepoError> {
        if self.slug_taken(new.publish.date_naive(), &new.slug, None) {
            return Err(slug_clash(&new.slug, new.publish.date_naive()));
        }

        self.last_post_id += 1;
        let post = Post {
            id: self.last_post_id,
            title: new.title,
            slug: new.slug,
            author_id: new.author_id,
            body: new.body,
            publish: new.publish,
            created: new.created,
            updated: new.created,
            status: new.status,
            tags: Vec::new(),
        };
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    fn store_post(&mut self, mut post: Post) -> Result<Post, RepoError> {
        if !self.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        if self.slug_taken(post.publish_date(), &post.slug, Some(post.id)) {
            return Err(slug_clash(&post.slug, post.publish_date()));
        }

        post.tags = Vec::new();
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    /// Link `post_id` to exactly `tags`, creating unknown tags.
    fn replace_tags(&mut self, post_id: i64, tags: Vec<TagName>) {
        self.post_tags.retain(|(p, _)| *p != post_id);
        for TagName { name, slug } in tags {
            let existing = self.tags.values().find(|t| t.slug == slug).map(|t| t.id);
            let tag_id = match existing {
                Some(id) => id,
                None => {
                    self.last_tag_id += 1;
                    let id = self.last_tag_id;
                    self.tags.insert(id, Tag { id, name, slug });
                    id
                }
            };
            self.post_tags.insert((post_id, tag_id));
        }
    }
}

fn slug_clash(slug: &str, date: NaiveDate) -> RepoError {
    RepoError::Constraint(format!("slug '{slug}' already used on {date}"))
}

fn tag_names(names: &[String]) -> Result<Vec<TagName>, RepoError> {
    parse_tag_names(names)
        .map_err(|name| RepoError::Constraint(format!("tag '{name}' has no letters or digits")))
}

fn page<T>(items: Vec<T>, offset: u64, limit: u64) -> AdminPage<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(offset as usize)
        .take(if limit == 0 { usize::MAX } else { limit as usize })
        .collect();
    AdminPage { items, total }
}

/// In-memory implementation of all blog repositories.
pub struct InMemoryBlogStore {
    tables: RwLock<Tables>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for InMemoryBlogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, User, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables.users.get_mut(&user.id).ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;

        let authored: Vec<i64> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            remove_post(&mut tables, post_id);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryBlogStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

/// Delete a post with its comments and tag links.
fn remove_post(tables: &mut Tables, post_id: i64) -> bool {
    if tables.posts.remove(&post_id).is_none() {
        return false;
    }
    tables.comments.retain(|_, c| c.post_id != post_id);
    tables.post_tags.retain(|(p, _)| *p != post_id);
    true
}

#[async_trait]
impl BaseRepository<Post, NewPost, i64> for InMemoryBlogStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|p| tables.with_tags(p)))
    }

    async fn create(&self, new: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.insert_post(new)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let stored = tables.store_post(post)?;
        Ok(tables.with_tags(&stored))
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if remove_post(&mut tables, id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn count_published(&self, tag_id: Option<i64>) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.published(tag_id).len() as u64)
    }

    async fn list_published(
        &self,
        tag_id: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .published(tag_id)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_published(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .find(|p| p.is_published() && p.slug == slug && p.publish_date() == date)
            .map(|p| tables.with_tags(p)))
    }

    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .get(&id)
            .filter(|p| p.is_published())
            .map(|p| tables.with_tags(p)))
    }

    async fn find_by_date_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .find(|p| p.slug == slug && p.publish_date() == date)
            .map(|p| tables.with_tags(p)))
    }

    async fn similar_posts(&self, post: &Post, limit: usize) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(rank_similar(post, tables.published(None), limit))
    }

    async fn search_titles(
        &self,
        query: &str,
        threshold: f64,
    ) -> Result<Vec<SearchHit>, RepoError> {
        let tables = self.tables.read().await;
        let posts: Vec<Post> = tables.posts.values().map(|p| tables.with_tags(p)).collect();
        Ok(rank_by_title(posts, query, threshold))
    }

    async fn create_with_tags(&self, new: NewPost, tags: &[String]) -> Result<Post, RepoError> {
        let tags = tag_names(tags)?;
        let mut tables = self.tables.write().await;
        let post = tables.insert_post(new)?;
        tables.replace_tags(post.id, tags);
        Ok(tables.with_tags(&post))
    }

    async fn update_with_tags(&self, post: Post, tags: &[String]) -> Result<Post, RepoError> {
        let tags = tag_names(tags)?;
        let mut tables = self.tables.write().await;
        let post = tables.store_post(post)?;
        tables.replace_tags(post.id, tags);
        Ok(tables.with_tags(&post))
    }

    async fn admin_list(&self, query: &PostAdminQuery) -> Result<AdminPage<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| query.matches(p))
            .map(|p| tables.with_tags(p))
            .collect();
        posts.sort_by(PostAdminQuery::ordering);
        Ok(page(posts, query.offset, query.limit))
    }
}

#[async_trait]
impl BaseRepository<Comment, NewComment, i64> for InMemoryBlogStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn create(&self, new: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&new.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                new.post_id
            )));
        }

        tables.last_comment_id += 1;
        let comment = Comment {
            id: tables.last_comment_id,
            post_id: new.post_id,
            name: new.name,
            email: new.email,
            body: new.body,
            created: new.created,
            updated: new.created,
            active: new.active,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .comments
            .get_mut(&comment.id)
            .ok_or(RepoError::NotFound)?;
        *slot = comment.clone();
        Ok(comment)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryBlogStore {
    async fn active_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn admin_list(
        &self,
        query: &CommentAdminQuery,
    ) -> Result<AdminPage<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(page(comments, query.offset, query.limit))
    }
}

#[async_trait]
impl TagRepository for InMemoryBlogStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        let mut tags: Vec<Tag> = tables.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use inkpost_core::domain::PostStatus;

    use super::*;

    async fn author(store: &InMemoryBlogStore) -> User {
        let users: &dyn UserRepository = store;
        users
            .create(User::new(
                "ada".to_string(),
                "ada@example.com".to_string(),
                "hash".to_string(),
                true,
            ))
            .await
            .unwrap()
    }

    async fn publish(
        store: &InMemoryBlogStore,
        author: &User,
        title: &str,
        day: u32,
        status: PostStatus,
        tags: &[&str],
    ) -> Post {
        let posts: &dyn PostRepository = store;
        let at = Utc.with_ymd_and_hms(2024, 6, day, 10, 0, 0).unwrap();
        let names: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        posts
            .create_with_tags(
                NewPost::new(author.id, title.to_string(), None, "body".to_string())
                    .with_status(status)
                    .published_at(at),
                &names,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_published_listing_hides_drafts() {
        let store = InMemoryBlogStore::new();
        let ada = author(&store).await;
        publish(&store, &ada, "Old", 1, PostStatus::Published, &["rust"]).await;
        publish(&store, &ada, "Draft", 2, PostStatus::Draft, &["rust"]).await;
        publish(&store, &ada, "New", 3, PostStatus::Published, &[]).await;

        let posts: &dyn PostRepository = &store;
        assert_eq!(posts.count_published(None).await.unwrap(), 2);

        let listed = posts.list_published(None, 0, 5).await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);

        let rust = store.find_by_slug("rust").await.unwrap().unwrap();
        assert_eq!(posts.count_published(Some(rust.id)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_slug_unique_per_date() {
        let store = InMemoryBlogStore::new();
        let ada = author(&store).await;
        let first = publish(&store, &ada, "Same", 1, PostStatus::Published, &[]).await;

        let posts: &dyn PostRepository = &store;
        let clash = NewPost::new(ada.id, "Same".to_string(), None, String::new())
            .published_at(first.publish + Duration::hours(1));
        assert!(matches!(
            posts.create(clash).await,
            Err(RepoError::Constraint(_))
        ));

        let next_day = NewPost::new(ada.id, "Same".to_string(), None, String::new())
            .published_at(first.publish + Duration::days(1));
        assert!(posts.create(next_day).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_published_by_date_and_slug() {
        let store = InMemoryBlogStore::new();
        let ada = author(&store).await;
        let post = publish(&store, &ada, "Hello There", 4, PostStatus::Published, &[]).await;
        let draft = publish(&store, &ada, "Hidden", 4, PostStatus::Draft, &[]).await;

        let posts: &dyn PostRepository = &store;
        let date = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let found = posts.find_published(date, "hello-there").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(post.id));

        assert!(posts.find_published(date, "hidden").await.unwrap().is_none());
        assert!(posts.find_published_by_id(draft.id).await.unwrap().is_none());
        assert!(posts.find_by_date_slug(date, "hidden").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_similar_posts_by_shared_tags() {
        let store = InMemoryBlogStore::new();
        let ada = author(&store).await;
        let current = publish(&store, &ada, "Current", 1, PostStatus::Published, &["a", "b"]).await;
        let one = publish(&store, &ada, "One", 2, PostStatus::Published, &["a"]).await;
        let two = publish(&store, &ada, "Two", 3, PostStatus::Published, &["a", "b"]).await;
        publish(&store, &ada, "Draft", 4, PostStatus::Draft, &["a", "b"]).await;
        publish(&store, &ada, "Other", 5, PostStatus::Published, &["c"]).await;

        let similar = store.similar_posts(&current, 4).await.unwrap();
        let ids: Vec<i64> = similar.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![two.id, one.id]);
    }

    #[tokio::test]
    async fn test_comments_cascade_with_post() {
        let store = InMemoryBlogStore::new();
        let ada = author(&store).await;
        let post = publish(&store, &ada, "Talk", 1, PostStatus::Published, &[]).await;

        let comments: &dyn CommentRepository = &store;
        let mut hidden = comments
            .create(NewComment::new(
                post.id,
                "Bob".to_string(),
                "bob@example.com".to_string(),
                "hidden".to_string(),
            ))
            .await
            .unwrap();
        comments
            .create(NewComment::new(
                post.id,
                "Eve".to_string(),
                "eve@example.com".to_string(),
                "visible".to_string(),
            ))
            .await
            .unwrap();
        hidden.set_active(false);
        comments.update(hidden).await.unwrap();

        let active = comments.active_for_post(post.id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Eve");

        let posts: &dyn PostRepository = &store;
        posts.delete(post.id).await.unwrap();
        let remaining = comments
            .admin_list(&CommentAdminQuery::default())
            .await
            .unwrap();
        assert_eq!(remaining.total, 0);
    }

    #[tokio::test]
    async fn test_search_covers_drafts() {
        let store = InMemoryBlogStore::new();
        let ada = author(&store).await;
        publish(&store, &ada, "Rust web", 1, PostStatus::Draft, &[]).await;
        publish(&store, &ada, "Baking bread", 2, PostStatus::Published, &[]).await;

        let hits = store.search_titles("rust web", 0.3).await.unwrap();
        let titles: Vec<&str> = hits.iter().map(|h| h.post.title.as_str()).collect();
        assert_eq!(titles, vec!["Rust web"]);
    }

    #[tokio::test]
    async fn test_unicode_tags_are_kept() {
        let store = InMemoryBlogStore::new();
        let ada = author(&store).await;
        let post =
            publish(&store, &ada, "Travel", 1, PostStatus::Published, &["日本語", "Café"]).await;

        let slugs: Vec<&str> = post.tags.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["日本語", "café"]);
        assert!(store.find_by_slug("日本語").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rejected_tag_leaves_post_untouched() {
        let store = InMemoryBlogStore::new();
        let ada = author(&store).await;
        let post = publish(&store, &ada, "Tagged", 1, PostStatus::Published, &["rust"]).await;

        let posts: &dyn PostRepository = &store;
        let mut edited = post.clone();
        edited.title = "Renamed".to_string();
        let result = posts
            .update_with_tags(edited, &["web".to_string(), "!!!".to_string()])
            .await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));

        let stored = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Tagged");
        assert_eq!(stored.tags.len(), 1);
        assert_eq!(stored.tags[0].slug, "rust");
        assert!(store.find_by_slug("web").await.unwrap().is_none());

        let clash = NewPost::new(ada.id, "Tagged".to_string(), None, String::new())
            .published_at(post.publish);
        assert!(posts.create_with_tags(clash, &["fresh".to_string()]).await.is_err());
        assert!(store.find_by_slug("fresh").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_tags_reuse_by_slug() {
        let store = InMemoryBlogStore::new();
        let ada = author(&store).await;
        let first = publish(&store, &ada, "First", 1, PostStatus::Published, &["Web Dev"]).await;
        let second =
            publish(&store, &ada, "Second", 2, PostStatus::Published, &["web dev", " ", "Rust"])
                .await;

        assert_eq!(first.tags[0].slug, "web-dev");
        assert_eq!(second.tags.len(), 2);
        assert_eq!(store.list_all().await.unwrap().len(), 2);
        assert!(second.tags.iter().any(|t| t.id == first.tags[0].id));
    }
}

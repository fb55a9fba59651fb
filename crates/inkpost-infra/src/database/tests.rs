#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::database::entity::{comment, post, post_tag, tag, user};
    use crate::database::postgres_repo::{
        PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
        PostgresUserRepository,
    };
    use inkpost_core::domain::{Comment, NewPost, Post, PostStatus, Tag};
    use inkpost_core::error::RepoError;
    use inkpost_core::ports::{
        BaseRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};

    fn post_model(id: i64, status: post::Status) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id,
            title: "Test Post".to_owned(),
            slug: "test-post".to_owned(),
            author_id: uuid::Uuid::new_v4(),
            body: "Content".to_owned(),
            publish: now.into(),
            created: now.into(),
            updated: now.into(),
            status,
        }
    }

    fn titled(id: i64, title: &str) -> post::Model {
        post::Model {
            title: title.to_owned(),
            ..post_model(id, post::Status::Published)
        }
    }

    /// Every statement the mock connection received, as one string.
    fn sql_log(db: DatabaseConnection) -> String {
        format!("{:?}", db.into_transaction_log())
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(7, post::Status::Published)]])
            .append_query_results(vec![Vec::<post_tag::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(7).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.id, 7);
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.status, PostStatus::Published);
        assert!(post.tags.is_empty());
    }

    #[tokio::test]
    async fn test_find_missing_post_skips_tag_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        assert!(repo.find_published_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        assert!(matches!(repo.delete(99).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_count_published() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(3)),
            )])]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        assert_eq!(repo.count_published(None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_similar_posts_without_tags_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PostgresPostRepository::new(db);

        let post = post_model(1, post::Status::Published).into_domain(Vec::new());

        assert!(repo.similar_posts(&post, 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_comment_by_id() {
        let now = chrono::Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![comment::Model {
                id: 3,
                post_id: 7,
                name: "Ann".to_owned(),
                email: "ann@example.com".to_owned(),
                body: "Nice".to_owned(),
                created: now.into(),
                updated: now.into(),
                active: true,
            }]])
            .into_connection();

        let repo = PostgresCommentRepository::new(db);
        let repo: &dyn CommentRepository = &repo;

        let comment: Comment = repo.find_by_id(3).await.unwrap().unwrap();
        assert_eq!(comment.post_id, 7);
        assert!(comment.active);
    }

    #[tokio::test]
    async fn test_active_comments_for_post() {
        let now = chrono::Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![comment::Model {
                id: 1,
                post_id: 7,
                name: "Bob".to_owned(),
                email: "bob@example.com".to_owned(),
                body: "First".to_owned(),
                created: now.into(),
                updated: now.into(),
                active: true,
            }]])
            .into_connection();

        let repo = PostgresCommentRepository::new(db);

        let comments = repo.active_for_post(7).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].name, "Bob");
    }

    #[tokio::test]
    async fn test_find_user_by_username() {
        let now = chrono::Utc::now();
        let id = uuid::Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user::Model {
                id,
                username: "admin".to_owned(),
                email: "admin@example.com".to_owned(),
                password_hash: "hash".to_owned(),
                is_staff: true,
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let user = repo.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert!(user.is_staff);
    }

    #[tokio::test]
    async fn test_find_tag_by_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![tag::Model {
                id: 2,
                name: "Rust Lang".to_owned(),
                slug: "rust-lang".to_owned(),
            }]])
            .into_connection();

        let repo = PostgresTagRepository::new(db);

        let tag = repo.find_by_slug("rust-lang").await.unwrap().unwrap();
        assert_eq!(tag.name, "Rust Lang");
        assert_eq!(tag.url(), "/blog/tag/rust-lang/");
    }

    #[tokio::test]
    async fn test_list_published_by_tag() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![titled(4, "Tagged"), titled(2, "Older")]])
            .append_query_results(vec![Vec::<post_tag::Model>::new()])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let posts = repo.list_published(Some(9), 0, 5).await.unwrap();
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 2]);

        let sql = sql_log(db);
        assert!(sql.contains("IN (SELECT"));
        assert!(sql.contains("post_tags"));
        assert!(sql.contains("published"));
        assert!(sql.contains("BigInt(Some(9))"));
    }

    #[tokio::test]
    async fn test_similar_posts_ranked_by_shared_tags() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![
                BTreeMap::from([
                    ("post_id", Value::BigInt(Some(5))),
                    ("same_tags", Value::BigInt(Some(2))),
                ]),
                BTreeMap::from([
                    ("post_id", Value::BigInt(Some(3))),
                    ("same_tags", Value::BigInt(Some(1))),
                ]),
            ]])
            .append_query_results(vec![vec![titled(3, "One tag"), titled(5, "Two tags")]])
            .append_query_results(vec![Vec::<post_tag::Model>::new()])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let current = post_model(1, post::Status::Published).into_domain(vec![
            Tag {
                id: 10,
                name: "a".to_owned(),
                slug: "a".to_owned(),
            },
            Tag {
                id: 11,
                name: "b".to_owned(),
                slug: "b".to_owned(),
            },
        ]);
        let similar = repo.similar_posts(&current, 4).await.unwrap();
        let ids: Vec<i64> = similar.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 3]);

        let sql = sql_log(db);
        assert!(sql.contains("COUNT("));
        assert!(sql.contains("GROUP BY"));
        assert!(sql.contains("INNER JOIN"));
        assert!(sql.contains("ORDER BY same_tags DESC"));
        assert!(sql.contains("<>"));
        assert!(sql.contains("LIMIT"));
    }

    #[tokio::test]
    async fn test_search_titles_scores_all_posts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![
                BTreeMap::from([
                    ("id", Value::BigInt(Some(2))),
                    ("score", Value::Double(Some(0.9))),
                ]),
                BTreeMap::from([
                    ("id", Value::BigInt(Some(1))),
                    ("score", Value::Double(Some(0.5))),
                ]),
            ]])
            .append_query_results(vec![vec![
                titled(1, "Rust web draft"),
                titled(2, "Rust web"),
            ]])
            .append_query_results(vec![Vec::<post_tag::Model>::new()])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let hits = repo.search_titles("rust web", 0.3).await.unwrap();
        let ranked: Vec<(i64, f64)> = hits.iter().map(|h| (h.post.id, h.similarity)).collect();
        assert_eq!(ranked, vec![(2, 0.9), (1, 0.5)]);

        let log = db.into_transaction_log();
        let ranking = format!("{:?}", log[0]);
        assert!(ranking.contains("similarity("));
        assert!(ranking.contains("ORDER BY score DESC"));
        assert!(ranking.contains("Double(Some(0.3))"));
        assert!(!ranking.contains("status"));
    }

    #[tokio::test]
    async fn test_create_with_tags_in_one_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![titled(8, "Fresh")]])
            .append_query_results(vec![
                Vec::new(),
                vec![tag::Model {
                    id: 3,
                    name: "Rust".to_owned(),
                    slug: "rust".to_owned(),
                }],
            ])
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let new = NewPost::new(uuid::Uuid::new_v4(), "Fresh".to_owned(), None, "Body".to_owned());
        let post = repo.create_with_tags(new, &["Rust".to_owned()]).await.unwrap();
        assert_eq!(post.id, 8);
        assert_eq!(post.tags.len(), 1);
        assert_eq!(post.tags[0].slug, "rust");

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = format!("{log:?}");
        assert!(sql.contains("BEGIN"));
        assert!(sql.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_invalid_tag_name_touches_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let post = post_model(42, post::Status::Draft).into_domain(Vec::new());
        let result = repo.update_with_tags(post, &["???".to_owned()]).await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
        assert!(db.into_transaction_log().is_empty());
    }
}

//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use sea_orm::sea_query::{Expr, Func, Query, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbConn, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    TransactionTrait, Value,
};
use inkpost_core::admin::{AdminPage, CommentAdminQuery, DateRange, PostAdminQuery};
use inkpost_core::domain::{Comment, NewPost, Post, Tag, TagName, User, parse_tag_names};
use inkpost_core::error::RepoError;
use inkpost_core::ports::{
    BaseRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};
use inkpost_core::search::SearchHit;

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity, Status};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// `[start, end)` of a UTC calendar day.
fn day_bounds(date: NaiveDate) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = start + chrono::Duration::days(1);
    (start.into(), end.into())
}

/// Case-insensitive `LIKE '%term%'` on a column.
fn icontains<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{escaped}%"))
}

fn within<C: ColumnTrait>(condition: Condition, column: C, range: &DateRange) -> Condition {
    let mut condition = condition;
    if let Some(from) = range.from {
        condition = condition.add(column.gte(DateTime::<FixedOffset>::from(from)));
    }
    if let Some(to) = range.to {
        condition = condition.add(column.lt(DateTime::<FixedOffset>::from(to)));
    }
    condition
}

fn paged<E: EntityTrait>(select: Select<E>, offset: u64, limit: u64) -> Select<E> {
    let select = select.offset(offset);
    if limit == 0 { select } else { select.limit(limit) }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn active_for_post(
        &self,
        post_id: i64,
    ) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Active.eq(true))
            .order_by_asc(comment::Column::Created)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn admin_list(
        &self,
        query: &CommentAdminQuery,
    ) -> Result<AdminPage<Comment>, RepoError> {
        let mut condition = Condition::all();
        if let Some(active) = query.active {
            condition = condition.add(comment::Column::Active.eq(active));
        }
        if let Some(post_id) = query.post_id {
            condition = condition.add(comment::Column::PostId.eq(post_id));
        }
        condition = within(condition, comment::Column::Created, &query.created);
        condition = within(condition, comment::Column::Updated, &query.updated);
        if let Some(term) = query.search_term() {
            condition = condition.add(
                Condition::any()
                    .add(icontains(comment::Column::Name, term))
                    .add(icontains(comment::Column::Email, term))
                    .add(icontains(comment::Column::Body, term)),
            );
        }

        let select = CommentEntity::find().filter(condition);
        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let items = paged(
            select
                .order_by_asc(comment::Column::Created)
                .order_by_asc(comment::Column::Id),
            query.offset,
            query.limit,
        )
        .all(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(AdminPage {
            items: items.into_iter().map(Into::into).collect(),
            total,
        })
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Tag>, RepoError> {
        let result = TagEntity::find()
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

fn tag_names(names: &[String]) -> Result<Vec<TagName>, RepoError> {
    parse_tag_names(names)
        .map_err(|name| RepoError::Constraint(format!("tag '{name}' has no letters or digits")))
}

/// Link `post_id` to exactly `tags` on `conn`, creating unknown tags.
/// Returned tags are ordered by name.
async fn replace_tags<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
    names: Vec<TagName>,
) -> Result<Vec<Tag>, RepoError> {
    let mut tags: Vec<tag::Model> = Vec::with_capacity(names.len());
    for TagName { name, slug } in names {
        let existing = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug.as_str()))
            .one(conn)
            .await
            .map_err(map_db_err)?;
        let tag = match existing {
            Some(tag) => tag,
            None => tag::ActiveModel {
                name: Set(name),
                slug: Set(slug),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(map_db_err)?,
        };
        tags.push(tag);
    }

    PostTagEntity::delete_many()
        .filter(post_tag::Column::PostId.eq(post_id))
        .exec(conn)
        .await
        .map_err(map_db_err)?;

    if !tags.is_empty() {
        let links = tags.iter().map(|t| post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(t.id),
        });
        PostTagEntity::insert_many(links)
            .exec_without_returning(conn)
            .await
            .map_err(map_db_err)?;
    }

    tags.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(tags.into_iter().map(Into::into).collect())
}

/// PostgreSQL post repository. Loads tags alongside posts.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    fn published() -> Select<PostEntity> {
        PostEntity::find().filter(post::Column::Status.eq(Status::Published))
    }

    fn tagged(select: Select<PostEntity>, tag_id: Option<i64>) -> Select<PostEntity> {
        match tag_id {
            Some(tag_id) => select.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_tag::Column::PostId)
                        .from(PostTagEntity)
                        .and_where(post_tag::Column::TagId.eq(tag_id))
                        .to_owned(),
                ),
            ),
            None => select,
        }
    }

    async fn tags_by_post(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<Tag>>, RepoError> {
        let mut map: HashMap<i64, Vec<Tag>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(map);
        }

        let rows = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(post_ids.iter().copied()))
            .find_also_related(TagEntity)
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        for (link, tag) in rows {
            if let Some(tag) = tag {
                map.entry(link.post_id).or_default().push(tag.into());
            }
        }
        Ok(map)
    }

    async fn with_tags(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut tags = self.tags_by_post(&ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let post_tags = tags.remove(&m.id).unwrap_or_default();
                m.into_domain(post_tags)
            })
            .collect())
    }

    async fn one_with_tags(&self, model: Option<post::Model>) -> Result<Option<Post>, RepoError> {
        match model {
            Some(model) => Ok(self.with_tags(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Load posts by id, returned in the order of `ids`.
    async fn load_in_order(&self, ids: &[i64]) -> Result<Vec<Post>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = PostEntity::find()
            .filter(post::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        let mut by_id: HashMap<i64, Post> = self
            .with_tags(models)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

#[async_trait]
impl BaseRepository<Post, NewPost, i64> for PostgresPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        self.one_with_tags(model).await
    }

    async fn create(&self, new: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(new)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(post_id = model.id, slug = %model.slug, "Post created");
        Ok(model.into_domain(Vec::new()))
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(entity)
            .update(&self.db)
            .await
            .map_err(map_db_err)?;
        self.one_with_tags(Some(model)).await?.ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count_published(&self, tag_id: Option<i64>) -> Result<u64, RepoError> {
        Self::tagged(Self::published(), tag_id)
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn list_published(
        &self,
        tag_id: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let models = Self::tagged(Self::published(), tag_id)
            .order_by_desc(post::Column::Publish)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        self.with_tags(models).await
    }

    async fn find_published(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let (start, end) = day_bounds(date);
        let model = Self::published()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Publish.gte(start))
            .filter(post::Column::Publish.lt(end))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        self.one_with_tags(model).await
    }

    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let model = Self::published()
            .filter(post::Column::Id.eq(id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        self.one_with_tags(model).await
    }

    async fn find_by_date_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let (start, end) = day_bounds(date);
        let model = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Publish.gte(start))
            .filter(post::Column::Publish.lt(end))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        self.one_with_tags(model).await
    }

    async fn similar_posts(&self, post: &Post, limit: usize) -> Result<Vec<Post>, RepoError> {
        let tag_ids: Vec<i64> = post.tags.iter().map(|t| t.id).collect();
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ranked: Vec<(i64, i64)> = PostTagEntity::find()
            .select_only()
            .column(post_tag::Column::PostId)
            .column_as(Expr::col(post_tag::Column::TagId).count(), "same_tags")
            .join(JoinType::InnerJoin, post_tag::Relation::Post.def())
            .filter(post_tag::Column::TagId.is_in(tag_ids))
            .filter(post_tag::Column::PostId.ne(post.id))
            .filter(post::Column::Status.eq(Status::Published))
            .group_by(post_tag::Column::PostId)
            .group_by(post::Column::Publish)
            .order_by_desc(Expr::cust("same_tags"))
            .order_by_desc(post::Column::Publish)
            .limit(limit as u64)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let ids: Vec<i64> = ranked.into_iter().map(|(id, _)| id).collect();
        self.load_in_order(&ids).await
    }

    async fn search_titles(
        &self,
        query: &str,
        threshold: f64,
    ) -> Result<Vec<SearchHit>, RepoError> {
        let score = Expr::cust_with_values(
            r#"similarity("posts"."title", $1)::float8"#,
            [query.to_string()],
        );
        let above = Expr::cust_with_values(
            r#"similarity("posts"."title", $1) > $2"#,
            [Value::from(query.to_string()), Value::from(threshold)],
        );

        let ranked: Vec<(i64, f64)> = PostEntity::find()
            .select_only()
            .column(post::Column::Id)
            .column_as(score, "score")
            .filter(above)
            .order_by_desc(Expr::cust("score"))
            .order_by_desc(post::Column::Publish)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let ids: Vec<i64> = ranked.iter().map(|(id, _)| *id).collect();
        let posts = self.load_in_order(&ids).await?;
        let scores: HashMap<i64, f64> = ranked.into_iter().collect();

        Ok(posts
            .into_iter()
            .map(|post| SearchHit {
                similarity: scores.get(&post.id).copied().unwrap_or_default(),
                post,
            })
            .collect())
    }

    async fn create_with_tags(&self, new: NewPost, tags: &[String]) -> Result<Post, RepoError> {
        let names = tag_names(tags)?;
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = post::ActiveModel::from(new)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        let tags = replace_tags(&txn, model.id, names).await?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::debug!(post_id = model.id, tags = tags.len(), "Post created");
        Ok(model.into_domain(tags))
    }

    async fn update_with_tags(&self, post: Post, tags: &[String]) -> Result<Post, RepoError> {
        let names = tag_names(tags)?;
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = post::ActiveModel::from(post)
            .update(&txn)
            .await
            .map_err(map_db_err)?;
        let tags = replace_tags(&txn, model.id, names).await?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::debug!(post_id = model.id, tags = tags.len(), "Post updated");
        Ok(model.into_domain(tags))
    }

    async fn admin_list(&self, query: &PostAdminQuery) -> Result<AdminPage<Post>, RepoError> {
        let mut condition = Condition::all();
        if let Some(status) = query.status {
            condition = condition.add(post::Column::Status.eq(Status::from(status)));
        }
        if let Some(author_id) = query.author_id {
            condition = condition.add(post::Column::AuthorId.eq(author_id));
        }
        condition = within(condition, post::Column::Created, &query.created);
        condition = within(condition, post::Column::Publish, &query.publish);
        if let Some(term) = query.search_term() {
            condition = condition.add(
                Condition::any()
                    .add(icontains(post::Column::Title, term))
                    .add(icontains(post::Column::Body, term)),
            );
        }

        let select = PostEntity::find().filter(condition);
        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let models = paged(
            select
                .order_by_asc(post::Column::Status)
                .order_by_asc(post::Column::Publish)
                .order_by_asc(post::Column::Id),
            query.offset,
            query.limit,
        )
        .all(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(AdminPage {
            items: self.with_tags(models).await?,
            total,
        })
    }
}

//! Admin JSON API: staff login, post and comment moderation, tags.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use inkpost_core::admin::{ADMIN_PAGE_SIZE, CommentAdminQuery, DateRange, PostAdminQuery};
use inkpost_core::domain::{Comment, NewPost, Post, PostStatus, parse_tag_names};
use inkpost_core::pagination::Paginator;
use inkpost_core::ports::{PasswordService, TokenService};
use inkpost_core::slug::slugify;
use inkpost_shared::dto::{
    AuthResponse, CommentModeration, CommentResponse, LoginRequest, PostPayload, PostResponse,
    TagResponse,
};
use inkpost_shared::{ApiResponse, Paginated};

use crate::middleware::auth::Staff;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const TITLE_MAX: usize = 250;
const SLUG_MAX: usize = 250;

/// Configure the `/admin/api` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/api")
            .route("/login", web::post().to(login))
            .route("/posts", web::get().to(list_posts))
            .route("/posts", web::post().to(create_post))
            .route("/posts/{id}", web::get().to(get_post))
            .route("/posts/{id}", web::put().to(update_post))
            .route("/posts/{id}", web::delete().to(delete_post))
            .route("/comments", web::get().to(list_comments))
            .route("/comments/{id}", web::patch().to(moderate_comment))
            .route("/tags", web::get().to(list_tags)),
    );
}

/// POST /admin/api/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::warn!(username = %user.username, "Failed admin login");
        return Err(AppError::Unauthorized);
    }
    if !user.is_staff {
        return Err(AppError::Forbidden);
    }

    let token = token_service
        .generate_token(user.id, &user.username, user.roles())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(username = %user.username, "Admin login");
    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds().max(0) as u64,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    pub status: Option<String>,
    pub author: Option<Uuid>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub publish_from: Option<DateTime<Utc>>,
    pub publish_to: Option<DateTime<Utc>>,
    pub q: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentListParams {
    pub active: Option<bool>,
    pub post: Option<i64>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub updated_from: Option<DateTime<Utc>>,
    pub updated_to: Option<DateTime<Utc>>,
    pub q: Option<String>,
    pub page: Option<String>,
}

/// Offset of the page the client asked for, before the total is known.
fn requested_offset(raw: Option<&str>) -> u64 {
    let number = raw
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1);
    (number - 1).saturating_mul(ADMIN_PAGE_SIZE)
}

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        url: post.absolute_url(),
        status: post.status.as_str().to_string(),
        tags: post
            .tags
            .into_iter()
            .map(|t| TagResponse {
                id: t.id,
                name: t.name,
                slug: t.slug,
            })
            .collect(),
        id: post.id,
        title: post.title,
        slug: post.slug,
        author_id: post.author_id,
        body: post.body,
        publish: post.publish,
        created: post.created,
        updated: post.updated,
    }
}

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        name: comment.name,
        email: comment.email,
        body: comment.body,
        created: comment.created,
        updated: comment.updated,
        active: comment.active,
    }
}

/// GET /admin/api/posts
pub async fn list_posts(
    _staff: Staff,
    state: web::Data<AppState>,
    params: web::Query<PostListParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let status = params
        .status
        .as_deref()
        .map(str::parse::<PostStatus>)
        .transpose()?;

    let mut query = PostAdminQuery {
        status,
        author_id: params.author,
        created: DateRange {
            from: params.created_from,
            to: params.created_to,
        },
        publish: DateRange {
            from: params.publish_from,
            to: params.publish_to,
        },
        search: params.q,
        offset: requested_offset(params.page.as_deref()),
        limit: ADMIN_PAGE_SIZE,
    };

    let mut page = state.posts.admin_list(&query).await?;
    let info = Paginator::new(page.total, ADMIN_PAGE_SIZE).resolve(params.page.as_deref());
    if info.offset() != query.offset {
        query.offset = info.offset();
        page = state.posts.admin_list(&query).await?;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(Paginated {
        items: page.items.into_iter().map(post_response).collect(),
        total: page.total,
        page: info.number,
        num_pages: info.num_pages,
    })))
}

/// GET /admin/api/posts/{id}
pub async fn get_post(
    _staff: Staff,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(*id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {} not found", id)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// Validated post fields.
struct PostInput {
    title: String,
    slug: String,
    body: String,
    status: Option<PostStatus>,
    publish: Option<DateTime<Utc>>,
    tags: Vec<String>,
}

impl TryFrom<PostPayload> for PostInput {
    type Error = AppError;

    fn try_from(payload: PostPayload) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let title = payload.title.trim().to_string();
        if title.is_empty() {
            errors.push("title: This field is required.".to_string());
        } else if title.chars().count() > TITLE_MAX {
            errors.push(format!("title: Ensure this value has at most {TITLE_MAX} characters."));
        }

        let slug = slugify(payload.slug.as_deref().unwrap_or(&title));
        if slug.is_empty() {
            errors.push("slug: Enter a valid slug.".to_string());
        } else if slug.chars().count() > SLUG_MAX {
            errors.push(format!("slug: Ensure this value has at most {SLUG_MAX} characters."));
        }

        if payload.body.trim().is_empty() {
            errors.push("body: This field is required.".to_string());
        }

        if let Err(name) = parse_tag_names(&payload.tags) {
            errors.push(format!("tags: \"{name}\" is not a valid tag name."));
        }

        let status = match payload.status.as_deref().map(str::parse::<PostStatus>) {
            Some(Ok(status)) => Some(status),
            Some(Err(e)) => {
                errors.push(format!("status: {e}"));
                None
            }
            None => None,
        };

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(Self {
            title,
            slug,
            body: payload.body,
            status,
            publish: payload.publish,
            tags: payload.tags,
        })
    }
}

/// Reject a slug already used on the same publish date by another post.
async fn ensure_unique_slug(
    state: &AppState,
    publish: DateTime<Utc>,
    slug: &str,
    except: Option<i64>,
) -> AppResult<()> {
    match state.posts.find_by_date_slug(publish.date_naive(), slug).await? {
        Some(other) if Some(other.id) != except => Err(AppError::Validation(vec![
            "slug: Slug must be unique for Publish date.".to_string(),
        ])),
        _ => Ok(()),
    }
}

/// POST /admin/api/posts
pub async fn create_post(
    staff: Staff,
    state: web::Data<AppState>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let input = PostInput::try_from(body.into_inner())?;

    let mut new = NewPost::new(staff.0.user_id, input.title, Some(input.slug), input.body);
    if let Some(status) = input.status {
        new = new.with_status(status);
    }
    if let Some(publish) = input.publish {
        new = new.published_at(publish);
    }
    ensure_unique_slug(&state, new.publish, &new.slug, None).await?;

    let post = state.posts.create_with_tags(new, &input.tags).await?;

    tracing::info!(post_id = post.id, slug = %post.slug, by = %staff.0.username, "Post created");
    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(post))))
}

/// PUT /admin/api/posts/{id}
pub async fn update_post(
    staff: Staff,
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let id = id.into_inner();
    let input = PostInput::try_from(body.into_inner())?;

    let mut post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {} not found", id)))?;

    post.title = input.title;
    post.slug = input.slug;
    post.body = input.body;
    if let Some(status) = input.status {
        post.status = status;
    }
    if let Some(publish) = input.publish {
        post.publish = publish;
    }
    post.updated = Utc::now();
    ensure_unique_slug(&state, post.publish, &post.slug, Some(id)).await?;

    let post = state.posts.update_with_tags(post, &input.tags).await?;

    tracing::info!(post_id = id, by = %staff.0.username, "Post updated");
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// DELETE /admin/api/posts/{id}
pub async fn delete_post(
    staff: Staff,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = id.into_inner();
    state.posts.delete(id).await?;

    tracing::info!(post_id = id, by = %staff.0.username, "Post deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// GET /admin/api/comments
pub async fn list_comments(
    _staff: Staff,
    state: web::Data<AppState>,
    params: web::Query<CommentListParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let mut query = CommentAdminQuery {
        active: params.active,
        post_id: params.post,
        created: DateRange {
            from: params.created_from,
            to: params.created_to,
        },
        updated: DateRange {
            from: params.updated_from,
            to: params.updated_to,
        },
        search: params.q,
        offset: requested_offset(params.page.as_deref()),
        limit: ADMIN_PAGE_SIZE,
    };

    let mut page = state.comments.admin_list(&query).await?;
    let info = Paginator::new(page.total, ADMIN_PAGE_SIZE).resolve(params.page.as_deref());
    if info.offset() != query.offset {
        query.offset = info.offset();
        page = state.comments.admin_list(&query).await?;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(Paginated {
        items: page.items.into_iter().map(comment_response).collect(),
        total: page.total,
        page: info.number,
        num_pages: info.num_pages,
    })))
}

/// PATCH /admin/api/comments/{id}
pub async fn moderate_comment(
    staff: Staff,
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<CommentModeration>,
) -> AppResult<HttpResponse> {
    let id = id.into_inner();
    let mut comment = state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("comment {} not found", id)))?;

    comment.set_active(body.active);
    let comment = state.comments.update(comment).await?;

    let message = if comment.active { "Comment activated" } else { "Comment deactivated" };
    tracing::info!(comment_id = id, active = comment.active, by = %staff.0.username, "Comment moderated");
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(comment_response(comment), message)))
}

/// GET /admin/api/tags
pub async fn list_tags(_staff: Staff, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags: Vec<TagResponse> = state
        .tags
        .list_all()
        .await?
        .into_iter()
        .map(|t| TagResponse {
            id: t.id,
            name: t.name,
            slug: t.slug,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(tags)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};

    use inkpost_core::domain::{NewComment, User};
    use inkpost_core::ports::{PasswordService, TokenService};
    use inkpost_infra::{
        Argon2PasswordService, InMemoryBlogStore, InMemoryMailer, JwtConfig, JwtTokenService,
    };

    use crate::config::BlogSettings;
    use crate::handlers::configure_routes;
    use crate::state::AppState;

    struct Fixture {
        state: AppState,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryBlogStore::new());
        let state = AppState::in_memory(
            store,
            Arc::new(InMemoryMailer::new()),
            BlogSettings::default(),
        );
        let passwords: Arc<dyn PasswordService> =
            Arc::new(Argon2PasswordService::with_params(8, 1, 1).unwrap());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".into(),
            ..JwtConfig::default()
        }));

        for (username, is_staff) in [("editor", true), ("reader", false)] {
            let hash = passwords.hash("s3cret-pass").unwrap();
            state
                .users
                .create(User::new(username.into(), format!("{username}@example.com"), hash, is_staff))
                .await
                .unwrap();
        }

        Fixture {
            state,
            tokens,
            passwords,
        }
    }

    macro_rules! app {
        ($fixture:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($fixture.state.clone()))
                    .app_data(web::Data::new($fixture.tokens.clone()))
                    .app_data(web::Data::new($fixture.passwords.clone()))
                    .configure(|cfg| configure_routes(cfg, None)),
            )
            .await
        };
    }

    macro_rules! login {
        ($app:expr, $username:expr) => {{
            let req = test::TestRequest::post()
                .uri("/admin/api/login")
                .set_json(json!({ "username": $username, "password": "s3cret-pass" }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&$app, req).await;
            format!("Bearer {}", body["access_token"].as_str().unwrap())
        }};
    }

    #[actix_web::test]
    async fn test_login_rejects_bad_password() {
        let f = fixture().await;
        let app = app!(f);

        let req = test::TestRequest::post()
            .uri("/admin/api/login")
            .set_json(json!({ "username": "editor", "password": "wrong" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_non_staff_login_is_forbidden() {
        let f = fixture().await;
        let app = app!(f);

        let req = test::TestRequest::post()
            .uri("/admin/api/login")
            .set_json(json!({ "username": "reader", "password": "s3cret-pass" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_admin_requires_staff_token() {
        let f = fixture().await;
        let app = app!(f);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/admin/api/posts").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let reader = f.state.users.find_by_username("reader").await.unwrap().unwrap();
        let token = f
            .tokens
            .generate_token(reader.id, &reader.username, reader.roles())
            .unwrap();
        let req = test::TestRequest::get()
            .uri("/admin/api/posts")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_create_post_prepopulates_slug_and_tags() {
        let f = fixture().await;
        let app = app!(f);
        let auth = login!(app, "editor");

        let req = test::TestRequest::post()
            .uri("/admin/api/posts")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({
                "title": "Hello Admin World",
                "body": "Body text",
                "status": "published",
                "publish": "2024-03-05T10:00:00Z",
                "tags": ["Rust", "Web Dev"]
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(res).await;
        let post = &body["data"];
        assert_eq!(post["slug"], "hello-admin-world");
        assert_eq!(post["status"], "published");
        assert_eq!(post["url"], "/blog/2024/3/5/hello-admin-world/");
        assert_eq!(post["tags"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri("/admin/api/tags")
            .insert_header(("Authorization", auth))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"][1]["slug"], "web-dev");
    }

    #[actix_web::test]
    async fn test_create_post_with_non_latin_title_and_tags() {
        let f = fixture().await;
        let app = app!(f);
        let auth = login!(app, "editor");

        let req = test::TestRequest::post()
            .uri("/admin/api/posts")
            .insert_header(("Authorization", auth))
            .set_json(json!({
                "title": "Crème brûlée",
                "body": "Dessert",
                "tags": ["日本語", "Café"]
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["slug"], "creme-brulee");
        let mut slugs: Vec<&str> = body["data"]["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["slug"].as_str().unwrap())
            .collect();
        slugs.sort_unstable();
        assert_eq!(slugs, ["café", "日本語"]);
    }

    #[actix_web::test]
    async fn test_invalid_tag_rejects_whole_update() {
        let f = fixture().await;
        let app = app!(f);
        let auth = login!(app, "editor");

        let req = test::TestRequest::post()
            .uri("/admin/api/posts")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({ "title": "Stable", "body": "text", "tags": ["rust"] }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/admin/api/posts/{}", body["data"]["id"]);

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({ "title": "Changed", "body": "text", "tags": ["web", "???"] }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(("Authorization", auth))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["title"], "Stable");
        assert_eq!(body["data"]["tags"][0]["slug"], "rust");
        assert!(f.state.tags.find_by_slug("web").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_duplicate_slug_on_same_date_is_rejected() {
        let f = fixture().await;
        let app = app!(f);
        let auth = login!(app, "editor");

        let payload = json!({
            "title": "Same Title",
            "body": "Body",
            "publish": "2024-03-05T10:00:00Z"
        });
        for expected in [StatusCode::CREATED, StatusCode::UNPROCESSABLE_ENTITY] {
            let req = test::TestRequest::post()
                .uri("/admin/api/posts")
                .insert_header(("Authorization", auth.clone()))
                .set_json(&payload)
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), expected);
        }

        let req = test::TestRequest::post()
            .uri("/admin/api/posts")
            .insert_header(("Authorization", auth))
            .set_json(json!({
                "title": "Same Title",
                "body": "Body",
                "publish": "2024-03-06T10:00:00Z"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn test_list_posts_filters_and_orders() {
        let f = fixture().await;
        let app = app!(f);
        let auth = login!(app, "editor");

        for (title, status, publish) in [
            ("Later published", "published", "2024-03-07T10:00:00Z"),
            ("Earlier published", "published", "2024-03-01T10:00:00Z"),
            ("A draft", "draft", "2024-03-09T10:00:00Z"),
        ] {
            let req = test::TestRequest::post()
                .uri("/admin/api/posts")
                .insert_header(("Authorization", auth.clone()))
                .set_json(json!({
                    "title": title, "body": "text", "status": status, "publish": publish
                }))
                .to_request();
            assert!(test::call_service(&app, req).await.status().is_success());
        }

        let req = test::TestRequest::get()
            .uri("/admin/api/posts")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let titles: Vec<&str> = body["data"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["A draft", "Earlier published", "Later published"]);

        let req = test::TestRequest::get()
            .uri("/admin/api/posts?status=published&q=LATER")
            .insert_header(("Authorization", auth))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["items"][0]["title"], "Later published");
    }

    #[actix_web::test]
    async fn test_moderate_comment() {
        let f = fixture().await;
        let app = app!(f);
        let auth = login!(app, "editor");

        let req = test::TestRequest::post()
            .uri("/admin/api/posts")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({ "title": "Discussed", "body": "text", "status": "published" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let post_id = body["data"]["id"].as_i64().unwrap();

        let comment = f
            .state
            .comments
            .create(NewComment::new(
                post_id,
                "Spammer".into(),
                "spam@example.com".into(),
                "Buy now".into(),
            ))
            .await
            .unwrap();

        let req = test::TestRequest::patch()
            .uri(&format!("/admin/api/comments/{}", comment.id))
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({ "active": false }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        assert!(f.state.comments.active_for_post(post_id).await.unwrap().is_empty());

        let req = test::TestRequest::get()
            .uri("/admin/api/comments?active=false&q=spam")
            .insert_header(("Authorization", auth))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["items"][0]["name"], "Spammer");
    }

    #[actix_web::test]
    async fn test_delete_post() {
        let f = fixture().await;
        let app = app!(f);
        let auth = login!(app, "editor");

        let req = test::TestRequest::post()
            .uri("/admin/api/posts")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({ "title": "Doomed", "body": "text" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/admin/api/posts/{}", body["data"]["id"]);

        for expected in [StatusCode::NO_CONTENT, StatusCode::NOT_FOUND] {
            let req = test::TestRequest::delete()
                .uri(&uri)
                .insert_header(("Authorization", auth.clone()))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }
    }
}

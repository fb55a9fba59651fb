//! Public blog pages: listing, detail with comments, share by email, search.

use actix_web::{HttpRequest, web};
use chrono::NaiveDate;
use serde::Deserialize;

use inkpost_core::domain::{Comment, Post, Tag};
use inkpost_core::forms::{CommentForm, EmailPostForm, FormErrors, SearchForm};
use inkpost_core::pagination::Paginator;
use inkpost_core::share::recommendation_email;
use inkpost_core::similar::SIMILAR_POSTS_LIMIT;

use crate::middleware::error::{PageError, PageResult};
use crate::state::AppState;
use crate::views::{
    HtmlTemplate, PostDetailTemplate, PostListTemplate, PostSearchTemplate, PostShareTemplate,
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// `/blog/{year}/{month}/{day}/{slug}/`; date parts are parsed by hand so
/// that malformed values become 404s.
#[derive(Debug, Deserialize)]
pub struct PostPath {
    pub year: String,
    pub month: String,
    pub day: String,
    pub slug: String,
}

impl PostPath {
    fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            self.year.parse().ok()?,
            self.month.parse().ok()?,
            self.day.parse().ok()?,
        )
    }
}

/// GET /blog/
pub async fn post_list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> PageResult<HtmlTemplate<PostListTemplate>> {
    render_list(&state, None, query.page.as_deref()).await
}

/// GET /blog/tag/{tag_slug}/
pub async fn post_list_by_tag(
    state: web::Data<AppState>,
    tag_slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> PageResult<HtmlTemplate<PostListTemplate>> {
    let tag = state
        .tags
        .find_by_slug(&tag_slug)
        .await?
        .ok_or(PageError::NotFound)?;

    render_list(&state, Some(tag), query.page.as_deref()).await
}

async fn render_list(
    state: &AppState,
    tag: Option<Tag>,
    raw_page: Option<&str>,
) -> PageResult<HtmlTemplate<PostListTemplate>> {
    let tag_id = tag.as_ref().map(|t| t.id);
    let total = state.posts.count_published(tag_id).await?;
    let page = Paginator::new(total, state.blog.posts_per_page).resolve(raw_page);

    let posts = state
        .posts
        .list_published(tag_id, page.offset(), page.limit())
        .await?;

    Ok(HtmlTemplate(PostListTemplate { posts, page, tag }))
}

async fn published_post(state: &AppState, path: &PostPath) -> PageResult<Post> {
    let date = path.date().ok_or(PageError::NotFound)?;
    state
        .posts
        .find_published(date, &path.slug)
        .await?
        .ok_or(PageError::NotFound)
}

/// GET /blog/{year}/{month}/{day}/{slug}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<PostPath>,
) -> PageResult<HtmlTemplate<PostDetailTemplate>> {
    let post = published_post(&state, &path).await?;
    render_detail(&state, post, CommentForm::default(), FormErrors::default(), None).await
}

/// POST /blog/{year}/{month}/{day}/{slug}/
pub async fn post_comment(
    state: web::Data<AppState>,
    path: web::Path<PostPath>,
    form: web::Form<CommentForm>,
) -> PageResult<HtmlTemplate<PostDetailTemplate>> {
    let post = published_post(&state, &path).await?;
    let form = form.into_inner();

    match form.clean() {
        Ok(cleaned) => {
            let comment = state.comments.create(cleaned.into_new_comment(post.id)).await?;
            tracing::info!(post_id = post.id, comment_id = comment.id, "Comment added");
            render_detail(
                &state,
                post,
                CommentForm::default(),
                FormErrors::default(),
                Some(comment),
            )
            .await
        }
        Err(errors) => {
            tracing::debug!(post_id = post.id, errors = ?errors.messages(), "Comment rejected");
            render_detail(&state, post, form, errors, None).await
        }
    }
}

async fn render_detail(
    state: &AppState,
    post: Post,
    form: CommentForm,
    errors: FormErrors,
    new_comment: Option<Comment>,
) -> PageResult<HtmlTemplate<PostDetailTemplate>> {
    let comments = state.comments.active_for_post(post.id).await?;
    let similar_posts = state.posts.similar_posts(&post, SIMILAR_POSTS_LIMIT).await?;

    Ok(HtmlTemplate(PostDetailTemplate {
        post,
        comments,
        new_comment,
        form,
        errors,
        similar_posts,
    }))
}

async fn shareable_post(state: &AppState, post_id: i64) -> PageResult<Post> {
    state
        .posts
        .find_published_by_id(post_id)
        .await?
        .ok_or(PageError::NotFound)
}

/// GET /blog/{post_id}/share/
pub async fn post_share(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
) -> PageResult<HtmlTemplate<PostShareTemplate>> {
    let post = shareable_post(&state, *post_id).await?;

    Ok(HtmlTemplate(PostShareTemplate {
        post,
        form: EmailPostForm::default(),
        errors: FormErrors::default(),
        sent: false,
    }))
}

/// POST /blog/{post_id}/share/
pub async fn post_share_send(
    req: HttpRequest,
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    form: web::Form<EmailPostForm>,
) -> PageResult<HtmlTemplate<PostShareTemplate>> {
    let post = shareable_post(&state, *post_id).await?;
    let form = form.into_inner();

    let form = match form.clean() {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return Ok(HtmlTemplate(PostShareTemplate {
                post,
                form,
                errors,
                sent: false,
            }));
        }
    };

    let post_url = absolute_url(&req, &post.absolute_url());
    let message = recommendation_email(&state.blog.mail_from, &form, &post, &post_url);
    state.mailer.send(message).await?;
    tracing::info!(post_id = post.id, "Post recommendation sent");

    Ok(HtmlTemplate(PostShareTemplate {
        post,
        form,
        errors: FormErrors::default(),
        sent: true,
    }))
}

/// Scheme and host of the incoming request joined with `path`.
fn absolute_url(req: &HttpRequest, path: &str) -> String {
    let info = req.connection_info();
    format!("{}://{}{}", info.scheme(), info.host(), path)
}

/// GET /blog/search/
pub async fn post_search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> PageResult<HtmlTemplate<PostSearchTemplate>> {
    let Some(raw) = query.into_inner().query else {
        return Ok(HtmlTemplate(PostSearchTemplate {
            form: SearchForm::default(),
            errors: FormErrors::default(),
            query: None,
            results: Vec::new(),
        }));
    };

    let form = SearchForm { query: raw };
    match form.cleaned_query() {
        Ok(cleaned) => {
            let results = state
                .posts
                .search_titles(&cleaned, state.blog.search_threshold)
                .await?;
            tracing::debug!(query = %cleaned, hits = results.len(), "Search executed");

            Ok(HtmlTemplate(PostSearchTemplate {
                form,
                errors: FormErrors::default(),
                query: Some(cleaned),
                results,
            }))
        }
        Err(errors) => Ok(HtmlTemplate(PostSearchTemplate {
            form,
            errors,
            query: None,
            results: Vec::new(),
        })),
    }
}

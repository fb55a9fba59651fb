//! Askama page templates and the responder that renders them.

use actix_web::{HttpRequest, HttpResponse, Responder, body::BoxBody, http::header::ContentType};
use askama::Template;

use inkpost_core::domain::{Comment, Post, Tag};
use inkpost_core::forms::{CommentForm, EmailPostForm, FormErrors, SearchForm};
use inkpost_core::pagination::PageInfo;
use inkpost_core::search::SearchHit;

/// Template wrapper that converts Askama templates into HTML responses.
pub struct HtmlTemplate<T>(pub T);

impl<T> Responder for HtmlTemplate<T>
where
    T: Template,
{
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        match self.0.render() {
            Ok(html) => HttpResponse::Ok()
                .content_type(ContentType::html())
                .body(html),
            Err(err) => {
                tracing::error!("Failed to render template: {}", err);
                HttpResponse::InternalServerError().body("Failed to render template")
            }
        }
    }
}

/// Landing page with the latest posts.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub latest: Vec<Post>,
}

/// Paginated list of published posts, optionally for one tag.
#[derive(Template)]
#[template(path = "blog/post/list.html")]
pub struct PostListTemplate {
    pub posts: Vec<Post>,
    pub page: PageInfo,
    pub tag: Option<Tag>,
}

#[derive(Template)]
#[template(path = "blog/post/detail.html")]
pub struct PostDetailTemplate {
    pub post: Post,
    pub comments: Vec<Comment>,
    /// Set right after a comment was accepted.
    pub new_comment: Option<Comment>,
    pub form: CommentForm,
    pub errors: FormErrors,
    pub similar_posts: Vec<Post>,
}

#[derive(Template)]
#[template(path = "blog/post/share.html")]
pub struct PostShareTemplate {
    pub post: Post,
    pub form: EmailPostForm,
    pub errors: FormErrors,
    pub sent: bool,
}

#[derive(Template)]
#[template(path = "blog/post/search.html")]
pub struct PostSearchTemplate {
    pub form: SearchForm,
    pub errors: FormErrors,
    /// The cleaned query once a valid search ran.
    pub query: Option<String>,
    pub results: Vec<SearchHit>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub title: &'static str,
}

//! Landing page.

use actix_web::web;

use crate::middleware::error::PageResult;
use crate::state::AppState;
use crate::views::{HomeTemplate, HtmlTemplate};

const LATEST_POSTS: u64 = 3;

/// GET /
pub async fn home(state: web::Data<AppState>) -> PageResult<HtmlTemplate<HomeTemplate>> {
    let latest = state.posts.list_published(None, 0, LATEST_POSTS).await?;
    Ok(HtmlTemplate(HomeTemplate { latest }))
}

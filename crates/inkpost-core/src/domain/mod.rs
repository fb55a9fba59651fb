//! Domain entities - the core business objects.

mod comment;
mod post;
mod tag;
mod user;

pub use comment::{Comment, NewComment};
pub use post::{NewPost, Post, PostStatus};
pub use tag::{Tag, TagName, parse_tag_names};
pub use user::User;

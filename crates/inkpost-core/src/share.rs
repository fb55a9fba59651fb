//! Post recommendation emails.

use crate::domain::Post;
use crate::forms::EmailPostForm;
use crate::ports::EmailMessage;

/// Sender used when none is configured.
pub const DEFAULT_SENDER: &str = "admin@myblog.com";

/// Build the recommendation email for `post`.
///
/// `post_url` must be absolute (scheme and host included).
pub fn recommendation_email(
    sender: &str,
    form: &EmailPostForm,
    post: &Post,
    post_url: &str,
) -> EmailMessage {
    let name = form.name.trim();
    let subject = format!(
        "{} ({}) recommends you reading \"{}\"",
        name,
        form.email.trim(),
        post.title
    );
    let body = format!(
        "Read \"{}\" at {}\n\n{}'s comments:{}",
        post.title,
        post_url,
        name,
        form.comments.trim()
    );

    EmailMessage {
        from: sender.to_string(),
        to: vec![form.to.trim().to_string()],
        subject,
        body,
    }
}

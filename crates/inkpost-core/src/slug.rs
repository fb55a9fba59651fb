//! URL slugs.

use deunicode::deunicode;

/// Convert text into an ASCII URL slug.
///
/// Non-ASCII text is transliterated first ("Crème" becomes "creme"), then
/// everything except alphanumerics, underscores, hyphens and whitespace is
/// dropped and runs of whitespace and hyphens collapse into single hyphens.
pub fn slugify(text: &str) -> String {
    collapse(&deunicode(text), |ch| ch.is_ascii_alphanumeric())
}

/// Convert text into a slug that keeps Unicode letters and digits.
///
/// Used for tags, whose slugs are shown as-is in `/blog/tag/{slug}/`.
pub fn slugify_unicode(text: &str) -> String {
    collapse(text, char::is_alphanumeric)
}

fn collapse(text: &str, keep: impl Fn(char) -> bool) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.chars() {
        if keep(ch) || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else if ch == '-' || ch.is_whitespace() {
            pending_separator = true;
        }
    }

    slug
}

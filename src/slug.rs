//! Slug derivation for article URLs.
//!
//! A slug is the lowercase, hyphen-joined form of the headline, restricted
//! to the Telugu script block plus ASCII word characters. Everything else is
//! stripped (not replaced), then whitespace and underscore runs collapse to
//! single hyphens, and leading/trailing hyphens are trimmed.
//!
//! A headline composed entirely of stripped characters (e.g. all emoji or
//! all punctuation) would yield an empty slug, so [`derive_slug`] substitutes
//! a timestamped fallback of the form `dispatch-<epoch-millis>`. The result
//! is always non-empty and collision-resistant. Total function, no errors.

/// Prefix for the timestamp fallback slug.
const FALLBACK_PREFIX: &str = "dispatch-";

/// Telugu Unicode block, the script this site publishes in.
const TELUGU_START: char = '\u{0C00}';
const TELUGU_END: char = '\u{0C7F}';

fn is_retained(c: char) -> bool {
    (TELUGU_START..=TELUGU_END).contains(&c)
        || c.is_ascii_alphanumeric()
        || c == '_'
        || c == '-'
        || c.is_whitespace()
}

/// Derive a URL-safe slug from a headline.
///
/// ```
/// use pressroom::slug::derive_slug;
///
/// assert_eq!(derive_slug("Gold Rates  Today!"), "gold-rates-today");
/// assert_eq!(derive_slug("బంగారం ధర"), "బంగారం-ధర");
/// assert!(derive_slug("!!!").starts_with("dispatch-"));
/// ```
pub fn derive_slug(title: &str) -> String {
    let stripped: String = title.trim().chars().filter(|&c| is_retained(c)).collect();

    let mut slug = String::with_capacity(stripped.len());
    let mut pending_hyphen = false;
    for c in stripped.chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            pending_hyphen = !slug.is_empty();
        } else {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        }
    }

    if slug.is_empty() {
        fallback_slug()
    } else {
        slug
    }
}

/// Timestamp fallback: `dispatch-<epoch-millis>`.
fn fallback_slug() -> String {
    format!("{FALLBACK_PREFIX}{}", chrono::Utc::now().timestamp_millis())
}

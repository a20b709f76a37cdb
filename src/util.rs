//! Shared utility functions used across the codebase.

/// Turn a topic string into a filename-safe slug.
///
/// Lowercases the topic, collapses each whitespace run into a single `_`,
/// and drops path separators. Other punctuation is kept as-is, so
/// `"Medical Industry!"` becomes `medical_industry!`.
pub fn slugify_topic(topic: &str) -> String {
    let mut slug = String::with_capacity(topic.len());
    let mut last_was_space = false;
    for c in topic.trim().chars() {
        if c.is_whitespace() {
            if !last_was_space {
                slug.push('_');
            }
            last_was_space = true;
        } else if c == '/' || c == '\\' {
            last_was_space = false;
        } else {
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
            last_was_space = false;
        }
    }
    slug
}

/// Download filename for a generated article: `<slug>_article.md`.
pub fn article_filename(topic: &str) -> String {
    format!("{}_article.md", slugify_topic(topic))
}

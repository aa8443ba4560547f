/// Turn a calendar name into a URL and object-key safe slug
/// "College Football Top 25" -> "college-football-top-25"
///
/// Whitespace becomes a hyphen, anything outside `[a-z0-9_-]` is dropped,
/// repeated hyphens collapse and leading/trailing hyphens are trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

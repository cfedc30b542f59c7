//! Label slugification.
//!
//! Slugs are load-bearing identifiers: the cache index resolves lookups by
//! slug as well as by id, so derivation must be deterministic and collisions
//! are rejected at registry build time, never discovered at runtime.

/// Slugifies a display label into a URL-safe identifier.
///
/// Lower-cases ASCII alphanumerics, collapses every run of other characters
/// into a single hyphen, and trims hyphens from both edges. A label with no
/// alphanumerics at all slugifies to the empty string, which the registry
/// treats as fatal.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_separator = false;

    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

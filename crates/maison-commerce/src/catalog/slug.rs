//! URL slugs for products and categories.

use crate::error::CommerceError;

/// Maximum slug length.
pub const MAX_SLUG_LENGTH: usize = 120;

/// Turn a display name into a URL slug.
///
/// Lower-cases ASCII letters and digits, collapses every other run of
/// characters into a single `-`, and trims dashes from both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug.truncate(MAX_SLUG_LENGTH);
    slug.trim_end_matches('-').to_string()
}

/// Check that a slug only uses `[a-z0-9-]` and isn't empty.
pub fn validate_slug(slug: &str) -> Result<(), CommerceError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH {
        return Err(CommerceError::validation(format!(
            "slug must be 1-{MAX_SLUG_LENGTH} characters"
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CommerceError::validation(
            "slug may only contain lowercase letters, digits and dashes",
        ));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(CommerceError::validation("slug cannot start or end with a dash"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Linen Summer Dress"), "linen-summer-dress");
        assert_eq!(slugify("  Men's T-Shirts & Tops!! "), "men-s-t-shirts-tops");
        assert_eq!(slugify("Kurta 2024"), "kurta-2024");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("summer-dresses").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Summer").is_err());
        assert!(validate_slug("-dresses").is_err());
        assert!(validate_slug("dresses and tops").is_err());
    }
}

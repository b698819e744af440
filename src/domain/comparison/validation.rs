//! Comparison validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DomainError;

static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATOR_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());

/// Turns a free-form comparison name into a URL-safe slug
///
/// Non-ASCII characters are dropped, the rest is lowercased, anything that
/// is not a word character, whitespace or hyphen is removed, and runs of
/// whitespace/hyphens collapse into a single hyphen.
pub fn slugify(name: &str) -> String {
    let ascii: String = name.chars().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let cleaned = DISALLOWED_CHARS.replace_all(&lowered, "");
    let slug = SEPARATOR_RUNS.replace_all(cleaned.trim(), "-");

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Fails when the upper bound is below the lower bound
pub fn validate_bounds(lower_bound: f64, upper_bound: f64) -> Result<(), DomainError> {
    if !lower_bound.is_finite() || !upper_bound.is_finite() {
        return Err(DomainError::validation(
            "Comparison bounds must be finite numbers",
        ));
    }

    if upper_bound < lower_bound {
        return Err(DomainError::validation(format!(
            "Upper bound ({}) cannot be lower than lower bound ({})",
            upper_bound, lower_bound
        )));
    }

    Ok(())
}

/// Validates a comparison name, returning its slug
pub fn validate_comparison_name(name: &str) -> Result<String, DomainError> {
    let slug = slugify(name);

    if slug.is_empty() {
        return Err(DomainError::validation(format!(
            "Comparison name '{}' does not contain any usable character",
            name
        )));
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Cosine Similarity"), "cosine-similarity");
        assert_eq!(slugify("  Jensen--Shannon  distance! "), "jensen-shannon-distance");
        assert_eq!(slugify("hellinger_2019"), "hellinger_2019");
        assert_eq!(slugify("Café"), "caf");
    }

    #[test]
    fn test_validate_bounds() {
        assert!(validate_bounds(0.0, 1.0).is_ok());
        assert!(validate_bounds(0.5, 0.5).is_ok());
        assert!(matches!(
            validate_bounds(1.0, 0.0),
            Err(DomainError::Validation { .. })
        ));
        assert!(validate_bounds(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_validate_comparison_name() {
        assert_eq!(validate_comparison_name("My Comparison").unwrap(), "my-comparison");
        assert!(validate_comparison_name("!!!").is_err());
    }
}

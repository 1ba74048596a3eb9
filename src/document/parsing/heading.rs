//! Heading detection
//!
//! A paragraph starts a new section exactly when its style id begins with the
//! heading prefix (`Heading` for Word's built-in `Heading1`..`Heading9`).

pub(crate) const DEFAULT_HEADING_PREFIX: &str = "Heading";

/// Detect a heading from the paragraph style id; an empty prefix disables detection
pub(crate) fn is_heading_style(style: &str, prefix: &str) -> bool {
    !prefix.is_empty() && style.starts_with(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_prefix_match() {
        assert!(is_heading_style("Heading1", DEFAULT_HEADING_PREFIX));
        assert!(is_heading_style("Heading", DEFAULT_HEADING_PREFIX));
        assert!(!is_heading_style("heading1", DEFAULT_HEADING_PREFIX));
        assert!(!is_heading_style("Normal", DEFAULT_HEADING_PREFIX));
        assert!(!is_heading_style("", DEFAULT_HEADING_PREFIX));
        assert!(!is_heading_style("Heading1", ""));
    }

    #[test]
    fn test_custom_prefix() {
        assert!(is_heading_style("見出し1", "見出し"));
        assert!(!is_heading_style("Heading1", "Title"));
    }
}

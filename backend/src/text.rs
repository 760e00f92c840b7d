//! Text scrubbing for names, addresses, and match keys
//!
//! Upstream records carry typesetting artifacts, zero-width spaces, and mixed
//! Unicode. Names are projected onto ASCII where that keeps them readable.

use unicode_normalization::UnicodeNormalization;

const ZERO_WIDTH_SPACE: char = '\u{200b}';

/// Scrub text of non-printable characters, typesetting artifacts, and
/// encoding noise.
///
/// The ASCII projection of the NFKD form is preferred. When that projection
/// is empty (e.g. a name written entirely in Cyrillic) or starts with a
/// quoted span, the trimmed Unicode form is kept instead.
///
/// # Example
/// ```
/// use kleptosyn_core::text::scrub_text;
///
/// assert_eq!(scrub_text("  José\u{200b} Ñúñez "), "Jose Nunez");
/// assert_eq!(scrub_text("Иван"), "Иван");
/// ```
pub fn scrub_text(text: &str) -> String {
    let min_scrub: String = text
        .nfkd()
        .filter(|c| *c != ZERO_WIDTH_SPACE)
        .collect::<String>()
        .trim()
        .to_string();

    let max_scrub: String = min_scrub
        .chars()
        .filter(char::is_ascii)
        .collect::<String>()
        .trim()
        .to_string();

    if max_scrub.is_empty() || starts_with_quoted_span(&max_scrub) {
        return min_scrub;
    }

    max_scrub
}

/// Scrub an optional field, mapping blanks and `"-"` placeholders to `None`
pub fn scrub_field(text: Option<&str>) -> Option<String> {
    let scrubbed = scrub_text(text?);
    if scrubbed.is_empty() || scrubbed == "-" {
        None
    } else {
        Some(scrubbed)
    }
}

/// Whether `code` has the shape of an ISO-3166 alpha-2 country code
pub fn is_country_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase())
}

fn starts_with_quoted_span(text: &str) -> bool {
    text.strip_prefix('"')
        .map(|rest| rest.contains('"'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_strips_diacritics_and_zero_width() {
        assert_eq!(scrub_text("Café\u{200b}"), "Cafe");
        assert_eq!(scrub_text("  Acme   Ltd  "), "Acme   Ltd");
    }

    #[test]
    fn test_scrub_keeps_non_latin_names() {
        assert_eq!(scrub_text(" Иван Петров "), "Иван Петров");
    }

    #[test]
    fn test_scrub_keeps_unicode_when_quoted() {
        assert_eq!(scrub_text("\"Ромашка\" LLC"), "\"Ромашка\" LLC");
    }

    #[test]
    fn test_scrub_field_placeholders() {
        assert_eq!(scrub_field(None), None);
        assert_eq!(scrub_field(Some("  ")), None);
        assert_eq!(scrub_field(Some("-")), None);
        assert_eq!(scrub_field(Some(" 1 Main St ")), Some("1 Main St".to_string()));
    }

    #[test]
    fn test_country_code_shape() {
        assert!(is_country_code("US"));
        assert!(!is_country_code("us"));
        assert!(!is_country_code("USA"));
        assert!(!is_country_code(""));
    }
}

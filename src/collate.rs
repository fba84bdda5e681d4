//! Locale-aware string ordering for output collections.
//!
//! Approximates a root-locale collator: punctuation sorts before digits, digits
//! before letters, letters compare case-insensitively, and on a case-only tie
//! lowercase sorts first.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Punctuation,
    Digit,
    Letter,
    Other,
}

fn primary(c: char) -> (CharClass, char) {
    if c.is_alphabetic() {
        (CharClass::Letter, c.to_lowercase().next().unwrap_or(c))
    } else if c.is_numeric() {
        (CharClass::Digit, c)
    } else if c.is_whitespace() || c.is_ascii_punctuation() {
        (CharClass::Punctuation, c)
    } else {
        (CharClass::Other, c)
    }
}

/// Compare two strings the way a locale collator would.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary)
        .cmp(b.chars().map(primary))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut items: Vec<&str>) -> Vec<&str> {
        items.sort_by(|a, b| locale_compare(a, b));
        items
    }

    #[test]
    fn test_case_insensitive_primary_order() {
        assert_eq!(sorted(vec!["beta", "Alpha", "gamma"]), vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_lowercase_before_uppercase_on_tie() {
        assert_eq!(sorted(vec!["Value", "value"]), vec!["value", "Value"]);
    }

    #[test]
    fn test_punctuation_and_digits_first() {
        assert_eq!(
            sorted(vec!["b", "2x", "--color", "_private", "a"]),
            vec!["--color", "_private", "2x", "a", "b"]
        );
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(locale_compare("val", "value"), Ordering::Less);
        assert_eq!(locale_compare("", "a"), Ordering::Less);
    }
}

//! core::naming
//!
//! Field naming rules.
//!
//! # Features
//!
//! - Canonical capitalization of pseudo-header names
//! - Splitting `Name: value` lines into their parts

/// Normalize a field name to its canonical capitalization.
///
/// The name is split on `-`, each word has its first character
/// uppercased and the remainder lowercased, and the words are rejoined:
///
/// # Example
///
/// ```
/// use bugsmith::core::naming::normalize_field_name;
///
/// assert_eq!(normalize_field_name("x-debbugs-CC"), "X-Debbugs-Cc");
/// assert_eq!(normalize_field_name("PACKAGE"), "Package");
/// assert_eq!(normalize_field_name("followup-for"), "Followup-For");
/// ```
pub fn normalize_field_name(name: &str) -> String {
    name.split('-')
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Split a `name: value` line into its name and value.
///
/// The name must be non-empty, must not contain a colon and must not
/// start with whitespace. The value is everything after the first colon
/// with leading whitespace removed.
///
/// Returns `None` for lines that do not have header syntax.
///
/// # Example
///
/// ```
/// use bugsmith::core::naming::split_field;
///
/// assert_eq!(split_field("Package: foo"), Some(("Package", "foo")));
/// assert_eq!(split_field(">Description:"), Some((">Description", "")));
/// assert_eq!(split_field(" indented: line"), None);
/// assert_eq!(split_field("no colon here"), None);
/// ```
pub fn split_field(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    if name.is_empty() || name.starts_with(char::is_whitespace) {
        return None;
    }
    Some((name, value.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_basic() {
        assert_eq!(normalize_field_name("package"), "Package");
        assert_eq!(normalize_field_name("X-DEBBUGS-CC"), "X-Debbugs-Cc");
        assert_eq!(normalize_field_name("usertags"), "Usertags");
    }

    #[test]
    fn normalize_keeps_empty_words() {
        assert_eq!(normalize_field_name("a--b"), "A--B");
        assert_eq!(normalize_field_name(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_field_name("x-DEBBUGS-cc");
        assert_eq!(normalize_field_name(&once), once);
    }

    #[test]
    fn split_field_value_keeps_inner_colons() {
        assert_eq!(
            split_field("Control: affects -1 src:foo"),
            Some(("Control", "affects -1 src:foo"))
        );
    }

    #[test]
    fn split_field_rejects_empty_name() {
        assert_eq!(split_field(": value"), None);
    }

    #[test]
    fn split_field_strips_leading_value_whitespace_only() {
        assert_eq!(split_field("Subject:   hi there  "), Some(("Subject", "hi there  ")));
    }
}

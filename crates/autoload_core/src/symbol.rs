//! Symbol-name conventions shared by the registry and resolvers.
//!
//! # Invariants
//! - The namespace prefix is the text before the *first* separator.
//! - Path derivation is a pure string transform; no filesystem access.

use std::path::MAIN_SEPARATOR;

/// Separator between namespace segments in a symbol name, e.g. `Admin\User`.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Splits a symbol at its first namespace separator.
///
/// Returns `(prefix, remainder)`, or `None` for symbols without a namespace.
pub fn split_namespace(symbol: &str) -> Option<(&str, &str)> {
    symbol.split_once(NAMESPACE_SEPARATOR)
}

/// Derives the relative source path for a symbol.
///
/// Every namespace separator and every underscore becomes a path separator,
/// so `Foo\Bar_Baz` maps to `Foo/Bar/Baz` on unix.
pub fn relative_path(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| {
            if c == NAMESPACE_SEPARATOR || c == '_' {
                MAIN_SEPARATOR
            } else {
                c
            }
        })
        .collect()
}

/// Trims all trailing separators and appends exactly one.
pub fn normalize_directory(directory: &str) -> String {
    let trimmed = directory.trim_end_matches(|c: char| c == '/' || c == MAIN_SEPARATOR);
    format!("{trimmed}{MAIN_SEPARATOR}")
}

#[cfg(all(test, unix))]
mod tests {
    use super::{normalize_directory, relative_path, split_namespace};

    #[test]
    fn splits_on_first_separator_only() {
        assert_eq!(
            split_namespace("Admin\\Models\\User"),
            Some(("Admin", "Models\\User"))
        );
        assert_eq!(split_namespace("User"), None);
    }

    #[test]
    fn leading_separator_yields_empty_prefix() {
        assert_eq!(split_namespace("\\User"), Some(("", "User")));
    }

    #[test]
    fn relative_path_replaces_separators_and_underscores() {
        assert_eq!(relative_path("Foo\\Bar_Baz"), "Foo/Bar/Baz");
        assert_eq!(relative_path("Swift_Mailer"), "Swift/Mailer");
        assert_eq!(relative_path("User"), "User");
    }

    #[test]
    fn normalize_directory_collapses_trailing_separators() {
        assert_eq!(normalize_directory("/app"), "/app/");
        assert_eq!(normalize_directory("/app/"), "/app/");
        assert_eq!(normalize_directory("/app///"), "/app/");
    }

    #[test]
    fn normalize_directory_keeps_degenerate_input() {
        assert_eq!(normalize_directory(""), "/");
        assert_eq!(normalize_directory("/app/./"), "/app/./");
    }
}

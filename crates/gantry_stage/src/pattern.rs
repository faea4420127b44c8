//! Wildcard path patterns.
//!
//! Template paths may stand in a regular expression for a literal
//! parent path, e.g. `/World/Table_[0-9]+`. A string counts as a
//! literal path only while it stays inside the restricted alphabet
//! (letters, digits, underscore, slash); any other character makes it
//! a pattern to be resolved against the stage.

use regex::Regex;
use thiserror::Error;

/// Errors that can occur when compiling a path pattern.
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid path pattern '{expr}': {source}")]
    Invalid {
        expr: String,
        source: regex::Error,
    },
}

/// Check whether a path expression is a plain literal path.
///
/// The empty string is not a path and reports false.
pub fn is_literal_path(expr: &str) -> bool {
    !expr.is_empty()
        && expr
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '/')
}

/// A compiled path pattern.
///
/// The expression is anchored on both ends, so it must match an entire
/// path rather than a substring of one.
#[derive(Clone, Debug)]
pub struct PathPattern {
    expr: String,
    regex: Regex,
}

impl PathPattern {
    /// Compile a pattern expression.
    ///
    /// The expression is wrapped in a non-capturing group before
    /// anchoring so that a top-level `|` cannot escape the anchors.
    pub fn new(expr: &str) -> Result<Self, PatternError> {
        let anchored = format!("^(?:{})$", expr);
        let regex = Regex::new(&anchored).map_err(|source| PatternError::Invalid {
            expr: expr.to_string(),
            source,
        })?;
        Ok(Self {
            expr: expr.to_string(),
            regex,
        })
    }

    /// The original (unanchored) expression.
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Test a concrete path string against the pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_paths() {
        assert!(is_literal_path("/World/Table"));
        assert!(is_literal_path("/World/Table_02"));
        assert!(is_literal_path("/"));
        assert!(!is_literal_path(""));
        assert!(!is_literal_path("/World/Table_.*"));
        assert!(!is_literal_path("/World/Table_[0-9]+"));
        assert!(!is_literal_path("/World/Ta ble"));
    }

    #[test]
    fn test_matches_whole_paths_only() {
        let pattern = PathPattern::new("/World/env_[0-9]+").unwrap();

        assert!(pattern.matches("/World/env_0"));
        assert!(pattern.matches("/World/env_42"));
        assert!(!pattern.matches("/World/env_0/box"));
        assert!(!pattern.matches("/Other/World/env_0"));
        assert!(!pattern.matches("/World/env_"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let pattern = PathPattern::new("/World/env_0|/Decoy").unwrap();

        assert!(pattern.matches("/World/env_0"));
        assert!(pattern.matches("/Decoy"));
        // both anchors apply to each alternative, not one to each end
        assert!(!pattern.matches("/World/env_0/box"));
        assert!(!pattern.matches("/Other/Decoy"));
    }

    #[test]
    fn test_invalid_pattern_reports_expression() {
        let err = PathPattern::new("/World/[").unwrap_err();
        let PatternError::Invalid { expr, .. } = err;
        assert_eq!(expr, "/World/[");
    }

    #[test]
    fn test_expr_round_trip() {
        let pattern = PathPattern::new("/World/.*").unwrap();
        assert_eq!(pattern.expr(), "/World/.*");
    }
}

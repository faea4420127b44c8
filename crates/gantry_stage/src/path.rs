//! Prim paths.
//!
//! Paths are absolute, slash-delimited addresses of prims on a stage,
//! e.g. `/World/Robot/base_link`. They are validated on construction so
//! the rest of the workspace can assume well-formed input.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing a prim path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path '{0}' is not absolute (must start with '/')")]
    NotAbsolute(String),

    #[error("path segment '{0}' is not a valid identifier")]
    InvalidSegment(String),
}

/// Result type for path operations.
pub type PathResult<T> = Result<T, PathError>;

/// Check whether a string is a valid prim name.
///
/// Names follow the identifier rule: a letter or underscore followed by
/// letters, digits or underscores.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An absolute, validated prim path.
///
/// The root path is `/`; every other path is one or more identifier
/// segments joined by `/`. Paths compare lexicographically, and that
/// ordering is the enumeration order used throughout the stage API.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrimPath(String);

impl PrimPath {
    /// The stage root path, `/`.
    pub fn root() -> Self {
        PrimPath("/".to_string())
    }

    /// Parse and validate a path string.
    pub fn new(path: &str) -> PathResult<Self> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        if !path.starts_with('/') {
            return Err(PathError::NotAbsolute(path.to_string()));
        }
        if path == "/" {
            return Ok(Self::root());
        }
        for segment in path[1..].split('/') {
            if !is_identifier(segment) {
                return Err(PathError::InvalidSegment(segment.to_string()));
            }
        }
        Ok(PrimPath(path.to_string()))
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the stage root.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The final segment of the path. Empty for the root.
    pub fn name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => "",
        }
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<PrimPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(PrimPath(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Append a child segment, validating it.
    pub fn child(&self, name: &str) -> PathResult<PrimPath> {
        if !is_identifier(name) {
            return Err(PathError::InvalidSegment(name.to_string()));
        }
        if self.is_root() {
            Ok(PrimPath(format!("/{}", name)))
        } else {
            Ok(PrimPath(format!("{}/{}", self.0, name)))
        }
    }

    /// Whether this path is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &PrimPath) -> bool {
        if self == other {
            return false;
        }
        if self.is_root() {
            return true;
        }
        other.0.starts_with(&self.0) && other.0.as_bytes().get(self.0.len()) == Some(&b'/')
    }
}

impl fmt::Display for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PrimPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for PrimPath {
    type Error = PathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<String> for PrimPath {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<PrimPath> for String {
    fn from(path: PrimPath) -> String {
        path.0
    }
}

// Lets `BTreeMap<PrimPath, _>` be range-scanned with plain `&str`
// bounds, which is how child enumeration works.
impl Borrow<str> for PrimPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

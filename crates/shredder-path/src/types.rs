//! Type definitions for tree paths.

use std::fmt;

/// A step in a tree path.
///
/// Either a string key (map member) or a non-negative integer index (list
/// slot). Tokens made only of ASCII digits are typed as indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A tree path. The empty path addresses the root.
pub type Path = Vec<Segment>;

impl Segment {
    /// Types a raw token: all-digit tokens become indices, the rest keys.
    ///
    /// # Example
    ///
    /// ```
    /// use shredder_path::Segment;
    ///
    /// assert_eq!(Segment::from_token("12"), Segment::Index(12));
    /// assert_eq!(Segment::from_token("foo"), Segment::key("foo"));
    /// assert_eq!(Segment::from_token(""), Segment::key(""));
    /// ```
    pub fn from_token(token: &str) -> Self {
        if crate::is_integer(token) {
            if let Ok(idx) = token.parse::<usize>() {
                return Segment::Index(idx);
            }
        }
        Segment::Key(token.to_string())
    }

    pub fn key(key: impl Into<String>) -> Self {
        Segment::Key(key.into())
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(k) => Some(k),
            Segment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(i) => Some(*i),
            Segment::Key(_) => None,
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(k),
            Segment::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(token: &str) -> Self {
        Segment::from_token(token)
    }
}

impl From<String> for Segment {
    fn from(token: String) -> Self {
        Segment::from_token(&token)
    }
}

impl From<usize> for Segment {
    fn from(idx: usize) -> Self {
        Segment::Index(idx)
    }
}

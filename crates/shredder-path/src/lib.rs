//! Path grammar and resolution for shredder trees.
//!
//! Paths are written in a dotted notation with an optional bracketed index per
//! dot-separated token, e.g. `users[2].name` or `a.b.0`. This crate parses
//! them into [`Segment`] sequences, memoizes parses in a bounded
//! [`PathResolver`], and carries the [JSON Pointer (RFC 6901)](https://tools.ietf.org/html/rfc6901)
//! helpers used by the patch wire format.
//!
//! # Example
//!
//! ```
//! use shredder_path::{parse_path, format_path, PathResolver, Segment};
//!
//! let path = parse_path("a.b[2].c");
//! assert_eq!(
//!     path,
//!     vec![Segment::key("a"), Segment::key("b"), Segment::Index(2), Segment::key("c")]
//! );
//! assert_eq!(format_path(&path), "a.b[2].c");
//!
//! let resolver = PathResolver::default();
//! assert_eq!(resolver.resolve("a.b[2].c"), path);
//! assert_eq!(resolver.len(), 1);
//! ```

pub mod resolver;
pub mod types;

pub use resolver::{PathResolver, DEFAULT_CACHE_CAPACITY};
pub use types::{Path, Segment};

/// First-segment keys that are never addressable through a path.
pub const RESERVED_KEYS: [&str; 2] = ["set", "get"];

/// Splits one dot-token into its segments.
///
/// Only the first bracket pair is recognized: `boom[1]` yields `boom` and
/// `1`, while `m[1][2]` yields `m` and `1`. A missing `]` takes the rest of
/// the token as the index text.
fn split_token(token: &str, out: &mut Path) {
    let Some(open) = token.find('[') else {
        out.push(Segment::from_token(token));
        return;
    };
    let inner = &token[open + 1..];
    let inner = match inner.find(']') {
        Some(close) => &inner[..close],
        None => inner,
    };
    out.push(Segment::from_token(&token[..open]));
    out.push(Segment::from_token(inner));
}

/// Parse a path string into segments, without caching.
///
/// # Example
///
/// ```
/// use shredder_path::{parse_path, Segment};
///
/// assert!(parse_path("").is_empty());
/// assert_eq!(parse_path("foo"), vec![Segment::key("foo")]);
/// assert_eq!(parse_path("list[3]"), vec![Segment::key("list"), Segment::Index(3)]);
/// assert_eq!(parse_path("list.3"), vec![Segment::key("list"), Segment::Index(3)]);
/// ```
pub fn parse_path(raw: &str) -> Path {
    if raw.is_empty() {
        return Vec::new();
    }
    let mut path = Vec::new();
    for token in raw.split('.') {
        split_token(token, &mut path);
    }
    path
}

/// Format segments back into the dotted notation.
///
/// An index directly following a key is rendered in brackets, any other index
/// as its own dot-token, so the output parses back to the same path as long
/// as keys contain neither `.` nor `[`.
///
/// # Example
///
/// ```
/// use shredder_path::{format_path, Segment};
///
/// assert_eq!(format_path(&[]), "");
/// assert_eq!(format_path(&[Segment::key("a"), Segment::Index(0), Segment::Index(1)]), "a[0].1");
/// ```
pub fn format_path(path: &[Segment]) -> String {
    let mut out = String::new();
    let mut bracket_open = false;
    for (i, segment) in path.iter().enumerate() {
        match segment {
            Segment::Index(idx) if bracket_open => {
                out.push('[');
                out.push_str(&idx.to_string());
                out.push(']');
                bracket_open = false;
            }
            _ => {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(&segment.to_string());
                bracket_open = !segment.is_index();
            }
        }
    }
    out
}

/// Check if the first segment collides with a reserved tool name.
///
/// # Example
///
/// ```
/// use shredder_path::{is_reserved, parse_path};
///
/// assert!(is_reserved(&parse_path("set.x")));
/// assert!(is_reserved(&parse_path("get")));
/// assert!(!is_reserved(&parse_path("x.set")));
/// ```
pub fn is_reserved(path: &[Segment]) -> bool {
    match path.first() {
        Some(Segment::Key(key)) => RESERVED_KEYS.contains(&key.as_str()),
        _ => false,
    }
}

/// Check if a string consists only of ASCII digits.
pub fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Check if a string represents a valid JSON Pointer array index.
///
/// # Example
///
/// ```
/// use shredder_path::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    if !is_integer(index) {
        return false;
    }
    // No leading zero unless it's just "0"
    !(index.len() > 1 && index.starts_with('0'))
}

/// Unescapes a JSON Pointer path component (`~1` → `/`, `~0` → `~`).
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~1 must be replaced before ~0
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component (`~` → `~0`, `/` → `~1`).
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~ must be escaped before /
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a JSON Pointer string into raw components.
///
/// # Example
///
/// ```
/// use shredder_path::parse_json_pointer;
///
/// assert_eq!(parse_json_pointer(""), Vec::<String>::new());
/// assert_eq!(parse_json_pointer("/foo/bar"), vec!["foo", "bar"]);
/// assert_eq!(parse_json_pointer("/a~0b/c~1d"), vec!["a~b", "c/d"]);
/// ```
pub fn parse_json_pointer(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    let body = pointer.strip_prefix('/').unwrap_or(pointer);
    body.split('/').map(unescape_component).collect()
}

/// Format raw components into a JSON Pointer string.
///
/// # Example
///
/// ```
/// use shredder_path::format_json_pointer;
///
/// assert_eq!(format_json_pointer(&[]), "");
/// assert_eq!(format_json_pointer(&["a~b".to_string(), "0".to_string()]), "/a~0b/0");
/// ```
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

//! Database paths
//!
//! Keys may not be empty and may not contain `.`, `#`, `$`, `[`, `]`, `/`
//! or ASCII control characters.

use crate::error::DatabaseError;
use std::fmt;

const FORBIDDEN: &[char] = &['.', '#', '$', '[', ']'];

/// Validated location in the database tree
///
/// The empty path is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DatabasePath {
    segments: Vec<String>,
}

impl DatabasePath {
    /// The root location
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-separated path; leading and trailing slashes are ignored
    pub fn parse(path: &str) -> Result<Self, DatabaseError> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let segments = trimmed
            .split('/')
            .map(validate_key)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Path extended by a relative path
    pub fn child(&self, relative: &str) -> Result<Self, DatabaseError> {
        let mut segments = self.segments.clone();
        segments.extend(Self::parse(relative)?.segments);
        Ok(Self { segments })
    }

    /// Last segment, `None` at the root
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent location, `None` at the root
    pub fn parent(&self) -> Option<Self> {
        let (_, parents) = self.segments.split_last()?;
        Some(Self {
            segments: parents.to_vec(),
        })
    }

    /// Path segments from the root
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the root location
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

fn validate_key(key: &str) -> Result<String, DatabaseError> {
    if key.is_empty() {
        return Err(DatabaseError::InvalidPath(
            "path cannot contain empty segments".to_string(),
        ));
    }
    if key.contains(FORBIDDEN) || key.chars().any(|c| c.is_ascii_control()) {
        return Err(DatabaseError::InvalidPath(format!(
            "key '{}' contains a forbidden character",
            key.escape_default()
        )));
    }
    Ok(key.to_string())
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let path = DatabasePath::parse("/users/abc123/").unwrap();
        assert_eq!(path.segments(), ["users", "abc123"]);
        assert_eq!(path.to_string(), "/users/abc123");
        assert_eq!(path.key(), Some("abc123"));
    }

    #[test]
    fn test_root() {
        let root = DatabasePath::parse("/").unwrap();
        assert!(root.is_root());
        assert_eq!(root.key(), None);
        assert_eq!(root.parent(), None);
        assert_eq!(root.to_string(), "/");
    }

    #[test]
    fn test_child_and_parent() {
        let users = DatabasePath::parse("users").unwrap();
        let alice = users.child("alice/personality").unwrap();
        assert_eq!(alice.to_string(), "/users/alice/personality");
        assert_eq!(alice.parent().unwrap().to_string(), "/users/alice");
    }

    #[test]
    fn test_rejects_empty_segment() {
        assert!(matches!(
            DatabasePath::parse("users//alice"),
            Err(DatabaseError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_rejects_forbidden_characters() {
        for bad in ["a.b", "a#b", "a$b", "a[b", "a]b", "a\u{7}b"] {
            assert!(
                DatabasePath::parse(bad).is_err(),
                "expected '{}' to be rejected",
                bad.escape_default()
            );
        }
    }
}

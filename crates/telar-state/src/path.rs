//! Dotted field identifiers.
//!
//! A `FieldPath` names a location inside a nested value: `"address.city"`
//! is the `city` key inside the `address` object. Paths are sequences of
//! object keys; array elements are never addressed individually (arrays are
//! opaque leaf values for the codec).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dotted field identifier, decomposed into its key segments.
///
/// The empty path is allowed and names the root of a value. Field components
/// that report an empty identity are ignored by the session registry, so an
/// empty `FieldPath` never becomes a registry key in practice.
///
/// # Examples
///
/// ```
/// use telar_state::FieldPath;
///
/// let path = FieldPath::parse("address.city");
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.to_string(), "address.city");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Create an empty path (root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted identifier, skipping empty segments.
    ///
    /// `parse("")` and `parse(".")` both yield the empty path.
    pub fn parse(name: &str) -> Self {
        let mut path = Self::root();
        for segment in name.split('.') {
            if !segment.is_empty() {
                path.0.push(segment.to_owned());
            }
        }
        path
    }

    /// Create a path from a vector of segments.
    #[inline]
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(k.into());
        self
    }

    /// Push a key segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, k: impl Into<String>) {
        self.0.push(k.into());
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the first segment.
    #[inline]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Get the last segment.
    #[inline]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Get the parent path (path without the last segment).
    #[inline]
    pub fn parent(&self) -> Option<FieldPath> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Join this path with another path.
    #[inline]
    pub fn join(&self, other: &FieldPath) -> FieldPath {
        let mut result = self.clone();
        result.0.extend(other.0.iter().cloned());
        result
    }

    /// Check if this path starts with another path.
    #[inline]
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{seg}")?;
            first = false;
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<String> for FieldPath {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl FromIterator<String> for FieldPath {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Construct a `FieldPath` from a sequence of key segments.
///
/// # Examples
///
/// ```
/// use telar_state::field_path;
///
/// let p = field_path!("address", "city");
/// assert_eq!(p.to_string(), "address.city");
/// ```
#[macro_export]
macro_rules! field_path {
    () => {
        $crate::FieldPath::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::FieldPath::root();
        $(
            p.push($seg);
        )+
        p
    }};
}

//! Node paths in the organization tree.
//!
//! A path is an ordered, non-empty list of non-empty segments. Containment is
//! always decided segment by segment: `/ab` is not an ancestor of `/abc`.
//!
//! Two textual forms are accepted by [`NodePath::parse`]:
//! - slash-delimited, with an optional leading slash: `/srbija/grad-beograd`
//! - dot-delimited, used inside URL path parameters: `srbija.grad-beograd`
//!
//! The storage form is always slash-delimited with a leading slash.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// Delimiter of the canonical (storage) form.
pub const DELIMITER: char = '/';

/// Delimiter used when a whole path is carried in a single URL segment.
pub const ROUTE_DELIMITER: char = '.';

/// Position of a node in the organization tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    /// Parse a raw slash- or dot-delimited path.
    ///
    /// A raw string containing `/` is slash-delimited; anything else is split
    /// on `.`. Segments are case-sensitive and never trimmed.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let (body, delimiter) = if raw.contains(DELIMITER) {
            (raw.strip_prefix(DELIMITER).unwrap_or(raw), DELIMITER)
        } else {
            (raw, ROUTE_DELIMITER)
        };

        if body.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<String> = body.split(delimiter).map(str::to_owned).collect();
        if let Some(position) = segments.iter().position(|s| s.is_empty()) {
            return Err(PathError::EmptySegment {
                raw: raw.to_string(),
                position,
            });
        }
        // A dotted segment would not survive the route form.
        if let Some(segment) = segments.iter().find(|s| s.contains(ROUTE_DELIMITER)) {
            return Err(PathError::InvalidSegment(segment.clone()));
        }

        Ok(Self { segments })
    }

    /// Build a path from already separated segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        for (position, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    raw: segments.join("/"),
                    position,
                });
            }
            if has_delimiter(segment) {
                return Err(PathError::InvalidSegment(segment.clone()));
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments (a root has depth 1).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// Last segment, used as the default display name of a node.
    pub fn name(&self) -> &str {
        // Non-empty by construction.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Immediate parent, or `None` for a root.
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Path of a direct child of this node.
    pub fn child(&self, segment: impl Into<String>) -> Result<NodePath, PathError> {
        let segment = segment.into();
        if segment.is_empty() {
            return Err(PathError::EmptySegment {
                raw: format!("{}/", self.to_storage_key()),
                position: self.segments.len(),
            });
        }
        if has_delimiter(&segment) {
            return Err(PathError::InvalidSegment(segment));
        }
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Self { segments })
    }

    /// `true` iff `self`'s segments are a prefix of `other`'s segments.
    pub fn is_ancestor_or_self(&self, other: &NodePath) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// `true` iff `self` lies strictly below `ancestor`.
    pub fn is_strict_descendant_of(&self, ancestor: &NodePath) -> bool {
        self.segments.len() > ancestor.segments.len() && ancestor.is_ancestor_or_self(self)
    }

    /// Canonical delimited form used for persistence and filters.
    pub fn to_storage_key(&self) -> String {
        let mut key = String::with_capacity(self.segments.iter().map(|s| s.len() + 1).sum());
        for segment in &self.segments {
            key.push(DELIMITER);
            key.push_str(segment);
        }
        key
    }

    /// Dot-delimited form suitable for a single URL path segment.
    pub fn to_route_param(&self) -> String {
        let mut param = String::with_capacity(self.segments.iter().map(|s| s.len() + 1).sum());
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                param.push(ROUTE_DELIMITER);
            }
            param.push_str(segment);
        }
        param
    }
}

fn has_delimiter(segment: &str) -> bool {
    segment.contains([DELIMITER, ROUTE_DELIMITER])
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_storage_key())
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NodePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NodePath> for String {
    fn from(value: NodePath) -> Self {
        value.to_storage_key()
    }
}

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::{Error, ErrorKind, Result};

/// Identity of a remediable resource: a normalized path relative to the workspace root.
///
/// Ordering is lexical on the relative path, which the prioritizer uses to break ties.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    rel: String,
}

impl ResourceId {
    /// Creates a ResourceId from a root and a candidate path.
    ///
    /// Absolute candidates must live under `root`; relative candidates are taken as-is.
    /// `.` segments are dropped and `..` segments are rejected so a resource can never
    /// escape the workspace.
    pub fn from_rooted(root: &Path, candidate: &Path) -> Result<Self> {
        let effective = if candidate.is_absolute() {
            match candidate.strip_prefix(root) {
                Ok(p) => p.to_path_buf(),
                Err(_) => {
                    return Err(Error::new(ErrorKind::Policy, "path escapes root"));
                }
            }
        } else {
            candidate.to_path_buf()
        };
        Self::normalize(&effective)
    }

    /// Creates a ResourceId from a relative path.
    pub fn new(rel: impl AsRef<Path>) -> Result<Self> {
        let rel = rel.as_ref();
        if rel.is_absolute() {
            return Err(Error::new(
                ErrorKind::InvalidPath,
                "resource id must be relative",
            ));
        }
        Self::normalize(rel)
    }

    fn normalize(effective: &Path) -> Result<Self> {
        let mut rel = PathBuf::new();
        for seg in effective.components() {
            match seg {
                Component::CurDir => {}
                Component::Normal(p) => rel.push(p),
                Component::ParentDir => {
                    return Err(Error::new(ErrorKind::Policy, "dotdot"));
                }
                _ => {
                    return Err(Error::new(ErrorKind::InvalidPath, "unsupported component"));
                }
            }
        }
        let Some(s) = rel.to_str() else {
            return Err(Error::new(ErrorKind::InvalidPath, "non-utf8 path"));
        };
        if s.is_empty() {
            return Err(Error::new(ErrorKind::InvalidPath, "empty resource id"));
        }
        Ok(Self { rel: s.to_string() })
    }

    /// Returns the full path of the resource under `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.rel)
    }

    pub fn as_str(&self) -> &str {
        &self.rel
    }

    pub fn rel(&self) -> &Path {
        Path::new(&self.rel)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rel)
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.rel)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ResourceId::new(&s).map_err(serde::de::Error::custom)
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Hierarchical `/`-separated path addressing a single document.
///
/// Paths alternate collection and document segments, so a document path
/// always has an even number of non-empty segments
/// (`events/nlc-2026/stats/overview`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocPath(String);

impl DocPath {
    pub fn parse(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let segments: Vec<&str> = path.split('/').collect();

        if segments.len() < 2
            || segments.len() % 2 != 0
            || segments.iter().any(|s| s.is_empty())
        {
            return Err(StoreError::InvalidPath(path));
        }

        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment, the document id within its collection.
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Parent collection of this document.
    pub fn collection(&self) -> CollectionPath {
        let end = self.0.len() - self.id().len() - 1;
        CollectionPath(self.0[..end].to_owned())
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DocPath {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<DocPath> for String {
    fn from(value: DocPath) -> Self {
        value.0
    }
}

/// Path addressing a collection of documents; odd number of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn parse(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let segments: Vec<&str> = path.split('/').collect();

        if segments.len() % 2 != 1 || segments.iter().any(|s| s.is_empty()) {
            return Err(StoreError::InvalidCollectionPath(path));
        }

        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Document path for `id` inside this collection.
    pub fn doc(&self, id: impl AsRef<str>) -> Result<DocPath> {
        DocPath::parse(format!("{}/{}", self.0, id.as_ref()))
    }

    /// Whether `doc` is an immediate member of this collection.
    pub fn contains(&self, doc: &DocPath) -> bool {
        doc.0.len() > self.0.len() + 1
            && doc.0.starts_with(&self.0)
            && doc.0.as_bytes()[self.0.len()] == b'/'
            && !doc.0[self.0.len() + 1..].contains('/')
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CollectionPath {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<CollectionPath> for String {
    fn from(value: CollectionPath) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_doc_path() {
        let path = DocPath::parse("events/nlc-2026/stats/overview").unwrap();

        assert_eq!(path.id(), "overview");
        assert_eq!(path.collection().as_str(), "events/nlc-2026/stats");
    }

    #[test]
    fn reject_odd_or_empty_segments() {
        assert!(DocPath::parse("events").is_err());
        assert!(DocPath::parse("events/a/b").is_err());
        assert!(DocPath::parse("events//registrants/r1").is_err());
        assert!(CollectionPath::parse("events/nlc-2026").is_err());
    }

    #[test]
    fn collection_membership() {
        let col = CollectionPath::parse("events/e1/registrants").unwrap();
        let doc = col.doc("r1").unwrap();
        let nested = DocPath::parse("events/e1/registrants/r1/extra/doc").unwrap();

        assert!(col.contains(&doc));
        assert!(!col.contains(&nested));
    }
}

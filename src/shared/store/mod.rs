mod firebase_rest;
mod memory;

pub use firebase_rest::RestDocumentStore;
pub use memory::MemoryDocumentStore;

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Slash-separated location in the remote keyed document store,
/// e.g. `cvs/{uid}/{cvUuid}`. Empty segments are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|segment| !segment.is_empty())
                .collect(),
        }
    }

    pub fn child(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        if !segment.is_empty() {
            self.segments.push(segment);
        }
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Underlying client failure, passed through untouched.
    #[error("store request failed: {0}")]
    Request(String),
}

/// Remote keyed document store boundary.
///
/// `read` returns the whole subtree under `path`. `merge` updates several
/// fields of the object at `path` in one atomic request.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError>;
    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;
    async fn merge(&self, path: &StorePath, fields: Map<String, Value>) -> Result<(), StoreError>;
    async fn delete(&self, path: &StorePath) -> Result<(), StoreError>;
}

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// A stored document: its id plus its data fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Query over one collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    /// `(field, value)`: keep documents whose array `field` contains `value`
    pub array_contains: Option<(String, String)>,
    pub order_by: Option<(String, SortOrder)>,
    pub limit: Option<usize>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn array_contains(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.array_contains = Some((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some((field.into(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Document storage collaborator
///
/// Collections hold JSON documents keyed by id. Implementations make no
/// promise about field types; callers normalize what they read.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document, `None` when it does not exist
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Write a document under a known id
    ///
    /// With `merge`, top-level fields in `document` overwrite the stored
    /// ones and the rest are kept; otherwise the document is replaced.
    async fn put(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Insert a document under a generated id and return that id
    async fn create(&self, collection: &str, document: Value) -> Result<String, StoreError>;

    /// Run a query over one collection
    async fn query(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError>;
}

/// Merge `patch` into `base` at the top level
pub fn merge_fields(base: &mut Value, patch: Value) {
    match patch {
        Value::Object(fields) if base.is_object() => {
            if let Some(target) = base.as_object_mut() {
                for (key, value) in fields {
                    target.insert(key, value);
                }
            }
        }
        patch => *base = patch,
    }
}

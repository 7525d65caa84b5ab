use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::core::normalize::parse_instant;
use crate::services::store::{
    merge_fields, Document, DocumentQuery, DocumentStore, SortOrder, StoreError,
};

/// In-process document store
///
/// Backs local development and tests. Documents are kept per collection in
/// id order, so unordered queries are deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        merge: bool,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if merge {
            if let Some(existing) = docs.get_mut(id) {
                merge_fields(existing, document);
                return Ok(());
            }
        }

        docs.insert(id.to_string(), document);
        Ok(())
    }

    async fn create(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), document);

        Ok(id)
    }

    async fn query(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<Document> = docs
            .iter()
            .filter(|(_, data)| match &query.array_contains {
                Some((field, value)) => data
                    .get(field)
                    .and_then(Value::as_array)
                    .map(|items| items.iter().any(|item| item.as_str() == Some(value.as_str())))
                    .unwrap_or(false),
                None => true,
            })
            .map(|(id, data)| Document {
                id: id.clone(),
                data: data.clone(),
            })
            .collect();

        if let Some((field, order)) = &query.order_by {
            rows.sort_by(|a, b| {
                let ordering = compare_field(a.data.get(field), b.data.get(field));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }
}

/// Order two field values; missing values sort last
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            if let (Some(x), Some(y)) = (parse_instant(a), parse_instant(b)) {
                return x.cmp(&y);
            }
            if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            }
            match (a.as_str(), b.as_str()) {
                (Some(x), Some(y)) => x.cmp(y),
                _ => Ordering::Equal,
            }
        }
    }
}

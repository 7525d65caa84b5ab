use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::services::store::{Document, DocumentQuery, DocumentStore, SortOrder, StoreError};

/// Appwrite API client
///
/// Backs the [`DocumentStore`] collaborator with Appwrite's databases REST
/// API: user profiles, session records, and anything else the app persists.
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.documents_url(collection), urlencoding::encode(id))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
    }

    async fn create_with_id(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<Value, StoreError> {
        let response = self
            .authorized(self.client.post(self.documents_url(collection)))
            .json(&json!({ "documentId": id, "data": document }))
            .send()
            .await?;

        let response = check_status(response, "create document").await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        tracing::debug!("Fetching document {}/{}", collection, id);

        let response = self
            .authorized(self.client.get(self.document_url(collection, id)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response, "fetch document").await?;
        let json: Value = response.json().await?;

        document_from_json(&json)
            .map(Some)
            .ok_or_else(|| StoreError::InvalidResponse("Missing $id in document".into()))
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        merge: bool,
    ) -> Result<(), StoreError> {
        if !merge {
            let response = self
                .authorized(self.client.put(self.document_url(collection, id)))
                .json(&json!({ "data": document }))
                .send()
                .await?;

            check_status(response, "replace document").await?;
            tracing::debug!("Replaced document {}/{}", collection, id);
            return Ok(());
        }

        let response = self
            .authorized(self.client.patch(self.document_url(collection, id)))
            .json(&json!({ "data": document }))
            .send()
            .await?;

        // Merge onto a missing document creates it
        if response.status() == StatusCode::NOT_FOUND {
            self.create_with_id(collection, id, document).await?;
            tracing::debug!("Created document {}/{} on merge", collection, id);
            return Ok(());
        }

        check_status(response, "update document").await?;
        tracing::debug!("Merged document {}/{}", collection, id);
        Ok(())
    }

    async fn create(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        let created = self.create_with_id(collection, "unique()", document).await?;

        created
            .get("$id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::InvalidResponse("Missing $id in created document".into()))
    }

    async fn query(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let queries = build_queries(query);

        let mut url = self.documents_url(collection);
        for (i, q) in queries.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str("queries%5B%5D=");
            url.push_str(&urlencoding::encode(q));
        }

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, "query documents").await?;
        let json: Value = response.json().await?;

        let total = json.get("total").and_then(Value::as_u64).unwrap_or(0);

        let documents = json
            .get("documents")
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::InvalidResponse("Missing documents array".into()))?;

        let rows: Vec<Document> = documents.iter().filter_map(document_from_json).collect();

        tracing::debug!(
            "Queried {} documents from {} (total: {})",
            rows.len(),
            collection,
            total
        );

        Ok(rows)
    }
}

/// Translate a [`DocumentQuery`] into Appwrite JSON query strings
fn build_queries(query: &DocumentQuery) -> Vec<String> {
    let mut queries = Vec::new();

    if let Some((field, value)) = &query.array_contains {
        queries.push(json!({ "method": "contains", "attribute": field, "values": [value] }));
    }

    if let Some((field, order)) = &query.order_by {
        let method = match order {
            SortOrder::Asc => "orderAsc",
            SortOrder::Desc => "orderDesc",
        };
        queries.push(json!({ "method": method, "attribute": field }));
    }

    if let Some(limit) = query.limit {
        queries.push(json!({ "method": "limit", "values": [limit] }));
    }

    queries.iter().map(Value::to_string).collect()
}

/// Split an Appwrite document into its id and its user fields
///
/// System attributes (`$id`, `$createdAt`, `$permissions`, ...) are dropped.
fn document_from_json(doc: &Value) -> Option<Document> {
    let id = doc.get("$id").and_then(Value::as_str)?.to_string();

    let data = match doc.get("data") {
        Some(data) if data.is_object() => data.clone(),
        _ => {
            let fields: Map<String, Value> = doc
                .as_object()?
                .iter()
                .filter(|(key, _)| !key.starts_with('$'))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            Value::Object(fields)
        }
    };

    Some(Document { id, data })
}

async fn check_status(response: Response, action: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(StoreError::Unauthorized);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read body".to_string());
    tracing::error!("Failed to {}: {} - {}", action, status, body);

    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(format!("Failed to {}: {}", action, status)));
    }

    Err(StoreError::ApiError(format!("Failed to {}: {}", action, status)))
}

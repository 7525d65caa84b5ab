use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::core::normalize_session;
use crate::models::{CreateSessionRequest, StudySession};
use crate::services::store::{DocumentQuery, DocumentStore, SortOrder, StoreError};

/// Study session records in the document store
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl SessionService {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Persist a new session with a zero interest counter
    ///
    /// `host_fallback` is used when the request carries no host name.
    pub async fn create_session(
        &self,
        request: CreateSessionRequest,
        created_by: &str,
        host_fallback: &str,
    ) -> Result<StudySession, StoreError> {
        let host_name = request
            .host_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(host_fallback)
            .to_string();

        let document = json!({
            "courseCode": request.course_code.trim(),
            "courseName": request.course_name.trim(),
            "hostName": host_name,
            "location": request.location.trim(),
            "startAt": request.start_at.to_rfc3339(),
            "endAt": request.end_at.to_rfc3339(),
            "interestedCount": 0,
            "createdBy": created_by,
            "goals": request.goals,
            "availability": request.availability,
            "createdAt": Utc::now().to_rfc3339(),
        });

        let id = self.store.create(&self.collection, document.clone()).await?;

        tracing::info!(
            "Created session {} for {} by {}",
            id,
            request.course_code,
            created_by
        );

        Ok(normalize_session(&id, &document))
    }

    pub async fn get_session(&self, id: &str) -> Result<Option<StudySession>, StoreError> {
        Ok(self
            .store
            .get(&self.collection, id)
            .await?
            .map(|doc| normalize_session(&doc.id, &doc.data)))
    }

    /// Sessions by start time, soonest first
    pub async fn list_upcoming(&self, limit: usize) -> Result<Vec<StudySession>, StoreError> {
        let query = DocumentQuery::new()
            .order_by("startAt", SortOrder::Asc)
            .limit(limit);

        let docs = self.store.query(&self.collection, &query).await?;

        Ok(docs
            .iter()
            .map(|doc| normalize_session(&doc.id, &doc.data))
            .collect())
    }

    /// Mirror the ledger's counter onto the session document
    ///
    /// Failures are logged and swallowed; the ledger stays authoritative.
    pub async fn sync_interest_count(&self, id: &str, count: u32) {
        let patch = json!({ "interestedCount": count });

        if let Err(e) = self.store.put(&self.collection, id, patch, true).await {
            tracing::warn!("Failed to sync interest count for session {}: {}", id, e);
        }
    }
}

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::core::{enrolled_in, normalize_profile, text::name_from_email};
use crate::models::{Identity, Profile, ProfileUpdateRequest};
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::store::{merge_fields, DocumentQuery, DocumentStore, StoreError};

/// Reads and writes user profiles through the document store
///
/// Every document read here leaves as a normalized [`Profile`].
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
    collection: String,
    cache: Option<Arc<CacheManager>>,
}

impl ProfileService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        cache: Option<Arc<CacheManager>>,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            cache,
        }
    }

    /// Make sure the identity has a profile document, and return it
    ///
    /// Safe to call on every sign-in: an existing profile only gets its
    /// `updatedAt` refreshed.
    pub async fn ensure_profile(&self, identity: &Identity) -> Result<Profile, StoreError> {
        if let Some(doc) = self.store.get(&self.collection, &identity.uid).await? {
            let touch = json!({ "updatedAt": Utc::now().to_rfc3339() });
            self.store
                .put(&self.collection, &identity.uid, touch.clone(), true)
                .await?;

            self.invalidate(&identity.uid).await;

            let mut data = doc.data;
            merge_fields(&mut data, touch);
            return Ok(normalize_profile(&identity.uid, &data));
        }

        let now = Utc::now();
        let profile = Profile {
            uid: identity.uid.clone(),
            display_name: name_from_email(&identity.email),
            email: Some(identity.email.clone()),
            uni: identity
                .email
                .split('@')
                .next()
                .filter(|local| !local.is_empty())
                .map(str::to_string),
            created_at: Some(now),
            updated_at: Some(now),
            ..Profile::default()
        };

        self.store
            .put(&self.collection, &identity.uid, profile.to_document(), true)
            .await?;

        tracing::info!("Created profile for {}", identity.uid);

        Ok(profile)
    }

    /// Fetch a profile, `None` if the document does not exist
    pub async fn get_profile(&self, uid: &str) -> Result<Option<Profile>, StoreError> {
        let key = CacheKey::profile(uid);

        if let Some(cache) = &self.cache {
            match cache.get::<Profile>(&key).await {
                Ok(Some(profile)) => return Ok(Some(profile)),
                Ok(None) => {}
                Err(e) => tracing::warn!("Profile cache read failed for {}: {}", uid, e),
            }
        }

        let Some(doc) = self.store.get(&self.collection, uid).await? else {
            return Ok(None);
        };
        let profile = normalize_profile(uid, &doc.data);

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &profile).await {
                tracing::warn!("Profile cache write failed for {}: {}", uid, e);
            }
        }

        Ok(Some(profile))
    }

    /// Merge an owner's edits into their profile
    ///
    /// The document identity cannot be changed through an update.
    pub async fn update_profile(
        &self,
        uid: &str,
        update: ProfileUpdateRequest,
    ) -> Result<Profile, StoreError> {
        let mut patch = update.into_document();
        if let Value::Object(fields) = &mut patch {
            fields.remove("uid");
            fields.insert("updatedAt".to_string(), Value::String(Utc::now().to_rfc3339()));
        }

        self.store.put(&self.collection, uid, patch, true).await?;

        self.invalidate(uid).await;

        let doc = self
            .store
            .get(&self.collection, uid)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", uid)))?;

        tracing::debug!("Updated profile for {}", uid);

        Ok(normalize_profile(uid, &doc.data))
    }

    /// Profiles for the partner feed, optionally limited to one course
    ///
    /// The course filter runs here rather than in the store: it ignores case
    /// and also reads the legacy `courses` field, which a store-level
    /// `array_contains` cannot do.
    pub async fn list_partners(
        &self,
        course_code: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Profile>, StoreError> {
        let course_code = course_code.filter(|c| !c.is_empty());

        let mut query = DocumentQuery::new();
        if course_code.is_none() {
            query = query.limit(limit);
        }

        let docs = self.store.query(&self.collection, &query).await?;

        Ok(docs
            .iter()
            .map(|doc| normalize_profile(&doc.id, &doc.data))
            .filter(|profile| enrolled_in(profile, course_code))
            .take(limit)
            .collect())
    }

    async fn invalidate(&self, uid: &str) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.delete(&CacheKey::profile(uid)).await {
                tracing::warn!("Failed to invalidate profile cache for {}: {}", uid, e);
            }
        }
    }
}

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::core::InterestTransition;

/// Errors that can occur when reading or writing interest state
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Per-session interest markers and their counter
///
/// Every change runs as one atomic read-modify-write over the counter and
/// the caller's marker, so concurrent toggles never double count and the
/// counter never goes negative.
#[async_trait]
pub trait InterestLedger: Send + Sync {
    /// Flip the caller's marker
    async fn toggle_interest(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<InterestTransition, LedgerError>;

    /// Set the caller's marker explicitly
    async fn set_interest(
        &self,
        session_id: &str,
        user_id: &str,
        interested: bool,
    ) -> Result<InterestTransition, LedgerError>;

    async fn is_interested(&self, session_id: &str, user_id: &str) -> Result<bool, LedgerError>;

    /// Counter per session; sessions never touched are absent
    async fn interest_counts(
        &self,
        session_ids: &[String],
    ) -> Result<HashMap<String, u32>, LedgerError>;

    /// Which of `session_ids` the user is interested in
    async fn my_interests(
        &self,
        user_id: &str,
        session_ids: &[String],
    ) -> Result<HashSet<String>, LedgerError>;

    async fn health_check(&self) -> Result<bool, LedgerError>;
}

#[derive(Debug, Default)]
struct SessionInterest {
    count: u32,
    markers: HashSet<String>,
}

/// In-process ledger for local runs and tests
#[derive(Debug, Default)]
pub struct MemoryLedger {
    sessions: Mutex<HashMap<String, SessionInterest>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    async fn apply(
        &self,
        session_id: &str,
        user_id: &str,
        want: Option<bool>,
    ) -> Result<InterestTransition, LedgerError> {
        if session_id.is_empty() || user_id.is_empty() {
            return Err(LedgerError::InvalidInput("session and user ids are required".into()));
        }

        let mut sessions = self.sessions.lock().await;
        let entry = sessions.entry(session_id.to_string()).or_default();

        let was_interested = entry.markers.contains(user_id);
        let transition = match want {
            Some(value) => InterestTransition::set(entry.count, was_interested, value),
            None => InterestTransition::toggle(entry.count, was_interested),
        };

        if transition.interested {
            entry.markers.insert(user_id.to_string());
        } else {
            entry.markers.remove(user_id);
        }
        entry.count = transition.count;

        Ok(transition)
    }
}

#[async_trait]
impl InterestLedger for MemoryLedger {
    async fn toggle_interest(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<InterestTransition, LedgerError> {
        self.apply(session_id, user_id, None).await
    }

    async fn set_interest(
        &self,
        session_id: &str,
        user_id: &str,
        interested: bool,
    ) -> Result<InterestTransition, LedgerError> {
        self.apply(session_id, user_id, Some(interested)).await
    }

    async fn is_interested(&self, session_id: &str, user_id: &str) -> Result<bool, LedgerError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .get(session_id)
            .map(|s| s.markers.contains(user_id))
            .unwrap_or(false))
    }

    async fn interest_counts(
        &self,
        session_ids: &[String],
    ) -> Result<HashMap<String, u32>, LedgerError> {
        let sessions = self.sessions.lock().await;
        Ok(session_ids
            .iter()
            .filter_map(|id| sessions.get(id).map(|s| (id.clone(), s.count)))
            .collect())
    }

    async fn my_interests(
        &self,
        user_id: &str,
        session_ids: &[String],
    ) -> Result<HashSet<String>, LedgerError> {
        let sessions = self.sessions.lock().await;
        Ok(session_ids
            .iter()
            .filter(|id| {
                sessions
                    .get(id.as_str())
                    .map(|s| s.markers.contains(user_id))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<bool, LedgerError> {
        Ok(true)
    }
}

use serde::{Deserialize, Serialize};
use crate::models::domain::{RecommendedSession, ScoredPartner};

/// Response for the partner feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerFeedResponse {
    pub partners: Vec<ScoredPartner>,
    pub total_candidates: usize,
}

/// Response for the session feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFeedResponse {
    /// Viewer's first name for the home greeting
    #[serde(rename = "firstName")]
    pub first_name: String,
    pub sessions: Vec<RecommendedSession>,
}

/// Interest state after a read or a change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub interested: bool,
    #[serde(rename = "interestedCount")]
    pub interested_count: u32,
}

/// Scoring endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: u8,
    pub reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code,
        }
    }
}

/// Demo seed response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResponse {
    pub seeded: Vec<String>,
}

// Route exports
pub mod debug;
pub mod health;
pub mod partners;
pub mod profile;
pub mod score;
pub mod sessions;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::core::Matcher;
use crate::models::{ErrorResponse, Identity, Profile};
use crate::services::{
    AuthError, DocumentStore, IdentityVerifier, InterestLedger, ProfileService, SessionService,
    StoreError,
};

/// Feed sizes
#[derive(Debug, Clone, Copy)]
pub struct FeedLimits {
    pub partner_default: usize,
    pub partner_max: usize,
    pub sessions: usize,
}

impl Default for FeedLimits {
    fn default() -> Self {
        Self {
            partner_default: 25,
            partner_max: 50,
            sessions: 50,
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub profiles: ProfileService,
    pub sessions: SessionService,
    pub ledger: Arc<dyn InterestLedger>,
    pub verifier: Arc<IdentityVerifier>,
    pub matcher: Matcher,
    pub limits: FeedLimits,
    pub users_collection: String,
    pub debug_routes: bool,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(profile::configure)
            .configure(partners::configure)
            .configure(sessions::configure)
            .configure(score::configure)
            .configure(debug::configure),
    );
}

/// Resolve the caller from the `Authorization` header
///
/// Any failure becomes a ready 401 response.
pub(crate) fn authenticate(state: &AppState, req: &HttpRequest) -> Result<Identity, HttpResponse> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    state.verifier.current_identity(header).map_err(|e| {
        tracing::debug!("Rejected request to {}: {}", req.path(), e);
        let error = match e {
            AuthError::MissingToken => "Missing credentials",
            _ => "Invalid credentials",
        };
        HttpResponse::Unauthorized().json(ErrorResponse::new(error, e.to_string(), 401))
    })
}

/// Load the caller's profile, creating it on first use
pub(crate) async fn viewer_profile(
    state: &AppState,
    identity: &Identity,
) -> Result<Profile, HttpResponse> {
    match state.profiles.get_profile(&identity.uid).await {
        Ok(Some(profile)) => Ok(profile),
        Ok(None) => state
            .profiles
            .ensure_profile(identity)
            .await
            .map_err(|e| store_failure("Failed to create profile", e)),
        Err(e) => Err(store_failure("Failed to fetch profile", e)),
    }
}

/// Map a store error onto the JSON error shape
pub(crate) fn store_failure(context: &str, e: StoreError) -> HttpResponse {
    match e {
        StoreError::NotFound(message) => {
            HttpResponse::NotFound().json(ErrorResponse::new(context, message, 404))
        }
        e => {
            tracing::error!("{}: {}", context, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(context, e.to_string(), 500))
        }
    }
}

pub(crate) fn validation_failure(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new("Validation failed", message, 400))
}

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(
            self.error.clone(),
            self.message.clone(),
            self.status_code,
        ))
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

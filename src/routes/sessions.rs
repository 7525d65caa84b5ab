use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

use crate::core::{text::first_name, InterestTransition};
use crate::models::{
    CreateSessionRequest, ErrorResponse, InterestResponse, SessionFeedQuery, SessionFeedResponse,
    SetInterestRequest, StudySession,
};
use crate::routes::{authenticate, store_failure, validation_failure, viewer_profile, AppState};
use crate::services::LedgerError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/sessions", web::get().to(session_feed))
        .route("/sessions", web::post().to(create_session))
        .route("/sessions/{id}/interest", web::get().to(get_interest))
        .route("/sessions/{id}/interest", web::post().to(toggle_interest))
        .route("/sessions/{id}/interest", web::put().to(set_interest));
}

/// Upcoming sessions with score, recommendation, and the caller's interest
///
/// GET /api/v1/sessions?limit=50
async fn session_feed(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<SessionFeedQuery>,
) -> impl Responder {
    let identity = match authenticate(&state, &req) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let viewer = match viewer_profile(&state, &identity).await {
        Ok(profile) => profile,
        Err(response) => return response,
    };

    let limit = query
        .limit
        .unwrap_or(state.limits.sessions)
        .min(state.limits.sessions);

    let mut sessions = match state.sessions.list_upcoming(limit).await {
        Ok(sessions) => sessions,
        Err(e) => return store_failure("Failed to list sessions", e),
    };

    let ids: Vec<String> = sessions.iter().map(|s| s.id.clone()).collect();

    // The ledger's counters win over whatever the documents carry
    match state.ledger.interest_counts(&ids).await {
        Ok(counts) => {
            for session in sessions.iter_mut() {
                if let Some(count) = counts.get(&session.id) {
                    session.interested_count = *count;
                }
            }
        }
        Err(e) => tracing::warn!("Failed to load interest counts, using stored counters: {}", e),
    }

    let mine = match state.ledger.my_interests(&identity.uid, &ids).await {
        Ok(mine) => mine,
        Err(e) => return ledger_failure("Failed to load interests", e),
    };

    let first_name = first_name(&viewer.display_name);
    let annotated = state.matcher.annotate_sessions(&viewer, sessions, &mine);

    tracing::info!("Returning {} sessions for {}", annotated.len(), identity.uid);

    HttpResponse::Ok().json(SessionFeedResponse {
        first_name,
        sessions: annotated,
    })
}

/// Host action: schedule a session
///
/// POST /api/v1/sessions
///
/// Request body:
/// ```json
/// {
///   "courseCode": "COMS W4701",
///   "courseName": "Artificial Intelligence",
///   "location": "Butler 209",
///   "startAt": "2025-10-09T18:00:00Z",
///   "endAt": "2025-10-09T20:00:00Z"
/// }
/// ```
async fn create_session(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateSessionRequest>,
) -> impl Responder {
    let identity = match authenticate(&state, &req) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    if let Err(errors) = body.validate() {
        return validation_failure(errors.to_string());
    }
    if !body.has_valid_window() {
        return validation_failure("endAt must be after startAt");
    }

    let host = match viewer_profile(&state, &identity).await {
        Ok(profile) => profile.display_name,
        Err(response) => return response,
    };

    match state
        .sessions
        .create_session(body.into_inner(), &identity.uid, &host)
        .await
    {
        Ok(session) => HttpResponse::Created().json(session),
        Err(e) => store_failure("Failed to create session", e),
    }
}

/// GET /api/v1/sessions/{id}/interest
async fn get_interest(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let identity = match authenticate(&state, &req) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let session = match find_session(&state, &path).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let interested = match state.ledger.is_interested(&session.id, &identity.uid).await {
        Ok(interested) => interested,
        Err(e) => return ledger_failure("Failed to read interest", e),
    };

    let count = match state.ledger.interest_counts(&[session.id.clone()]).await {
        Ok(counts) => counts
            .get(&session.id)
            .copied()
            .unwrap_or(session.interested_count),
        Err(e) => return ledger_failure("Failed to read interest count", e),
    };

    HttpResponse::Ok().json(InterestResponse {
        session_id: session.id,
        interested,
        interested_count: count,
    })
}

/// Flip the caller's interest
///
/// POST /api/v1/sessions/{id}/interest
async fn toggle_interest(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let identity = match authenticate(&state, &req) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let session = match find_session(&state, &path).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let result = state.ledger.toggle_interest(&session.id, &identity.uid).await;
    interest_response(&state, session, result).await
}

/// Set the caller's interest explicitly
///
/// PUT /api/v1/sessions/{id}/interest
///
/// Request body: `{ "value": true }`
async fn set_interest(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<SetInterestRequest>,
) -> impl Responder {
    let identity = match authenticate(&state, &req) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let session = match find_session(&state, &path).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let result = state
        .ledger
        .set_interest(&session.id, &identity.uid, body.value)
        .await;
    interest_response(&state, session, result).await
}

async fn find_session(state: &AppState, id: &str) -> Result<StudySession, HttpResponse> {
    match state.sessions.get_session(id).await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(HttpResponse::NotFound().json(ErrorResponse::new(
            "Session not found",
            format!("No session with id {}", id),
            404,
        ))),
        Err(e) => Err(store_failure("Failed to fetch session", e)),
    }
}

async fn interest_response(
    state: &AppState,
    session: StudySession,
    result: Result<InterestTransition, LedgerError>,
) -> HttpResponse {
    let transition = match result {
        Ok(transition) => transition,
        Err(e) => return ledger_failure("Failed to update interest", e),
    };

    if transition.changed {
        state
            .sessions
            .sync_interest_count(&session.id, transition.count)
            .await;
    }

    HttpResponse::Ok().json(InterestResponse {
        session_id: session.id,
        interested: transition.interested,
        interested_count: transition.count,
    })
}

fn ledger_failure(context: &str, e: LedgerError) -> HttpResponse {
    tracing::error!("{}: {}", context, e);
    HttpResponse::InternalServerError().json(ErrorResponse::new(context, e.to_string(), 500))
}

use actix_web::{web, HttpResponse, Responder};

use crate::core::{attributes_from_value, score_partner, score_session, session_attributes_from_value};
use crate::models::{ScorePartnerRequest, ScoreResponse, ScoreSessionRequest};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/score/partner", web::post().to(score_partner_pair))
        .route("/score/session", web::post().to(score_session_pair));
}

/// Score a raw viewer/candidate pair
///
/// POST /api/v1/score/partner
///
/// Missing or malformed attribute lists count as empty.
/// ```json
/// {
///   "viewer": { "courses": ["COMS W4701"], "tags": ["pomodoro"] },
///   "candidate": { "enrolledCourses": ["coms w4701"], "studyStyle": ["Pomodoro"] }
/// }
/// ```
async fn score_partner_pair(
    state: web::Data<AppState>,
    body: web::Json<ScorePartnerRequest>,
) -> impl Responder {
    let viewer = attributes_from_value(&body.viewer);
    let candidate = attributes_from_value(&body.candidate);

    let result = score_partner(&viewer, &candidate, state.matcher.partner_weights());

    HttpResponse::Ok().json(ScoreResponse {
        score: result.score,
        reasons: result.reasons,
        recommended: None,
    })
}

/// Score a raw viewer/session pair
///
/// POST /api/v1/score/session
async fn score_session_pair(
    state: web::Data<AppState>,
    body: web::Json<ScoreSessionRequest>,
) -> impl Responder {
    let viewer = attributes_from_value(&body.viewer);
    let session = session_attributes_from_value(&body.session);

    let result = score_session(&viewer, &session, state.matcher.session_weights());

    HttpResponse::Ok().json(ScoreResponse {
        recommended: Some(state.matcher.is_recommended(result.score)),
        score: result.score,
        reasons: result.reasons,
    })
}

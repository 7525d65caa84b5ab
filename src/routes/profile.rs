use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

use crate::models::ProfileUpdateRequest;
use crate::routes::{authenticate, store_failure, validation_failure, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profile/me", web::get().to(get_my_profile))
        .route("/profile/me", web::put().to(update_my_profile));
}

/// Own profile, created on first sign-in
///
/// GET /api/v1/profile/me
async fn get_my_profile(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let identity = match authenticate(&state, &req) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    match state.profiles.ensure_profile(&identity).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => store_failure("Failed to load profile", e),
    }
}

/// Merge edits into the caller's profile
///
/// PUT /api/v1/profile/me
///
/// List fields accept arrays or comma-separated strings:
/// ```json
/// {
///   "name": "Amina K",
///   "enrolledCourses": "COMS W4701, COMS W3157",
///   "studyStyle": ["pomodoro"]
/// }
/// ```
async fn update_my_profile(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ProfileUpdateRequest>,
) -> impl Responder {
    let identity = match authenticate(&state, &req) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    if let Err(errors) = body.validate() {
        return validation_failure(errors.to_string());
    }

    // The document must exist before a merge lands on it
    if let Err(e) = state.profiles.ensure_profile(&identity).await {
        return store_failure("Failed to load profile", e);
    }

    match state
        .profiles
        .update_profile(&identity.uid, body.into_inner())
        .await
    {
        Ok(profile) => {
            tracing::info!("Profile saved for {}", identity.uid);
            HttpResponse::Ok().json(profile)
        }
        Err(e) => store_failure("Failed to save profile", e),
    }
}

use actix_web::{web, HttpResponse, Responder};

use crate::models::{ErrorResponse, SeedResponse};
use crate::routes::{store_failure, AppState};
use crate::services::{demo_profiles, seed_demo_profiles};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/debug/seed", web::post().to(seed));
}

/// Write the demo profiles into the users collection
///
/// POST /api/v1/debug/seed
///
/// Answers 404 unless debug routes are enabled.
async fn seed(state: web::Data<AppState>) -> impl Responder {
    if !state.debug_routes {
        return HttpResponse::NotFound().json(ErrorResponse::new(
            "Not found",
            "Debug routes are disabled",
            404,
        ));
    }

    match seed_demo_profiles(state.store.as_ref(), &state.users_collection).await {
        Ok(_) => HttpResponse::Ok().json(SeedResponse {
            seeded: demo_profiles()
                .into_iter()
                .map(|(uid, _)| uid.to_string())
                .collect(),
        }),
        Err(e) => store_failure("Failed to seed demo profiles", e),
    }
}

use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::core::text::csv_to_list;
use crate::models::{PartnerFeedQuery, PartnerFeedResponse, PartnerFilter};
use crate::routes::{authenticate, store_failure, viewer_profile, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/partners", web::get().to(partner_feed));
}

/// Scored partner feed
///
/// GET /api/v1/partners?course=COMS%20W4701&q=amina&dismissed=demo2,demo3&limit=25
///
/// Without `course` the feed follows the viewer's first course; an empty
/// `course=` shows everyone.
async fn partner_feed(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PartnerFeedQuery>,
) -> impl Responder {
    let identity = match authenticate(&state, &req) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let viewer = match viewer_profile(&state, &identity).await {
        Ok(profile) => profile,
        Err(response) => return response,
    };

    let query = query.into_inner();
    let course = match query.course {
        Some(course) => Some(course.trim().to_string()).filter(|c| !c.is_empty()),
        None => viewer.courses.first().cloned(),
    };

    let limits = state.limits;
    let limit = query
        .limit
        .unwrap_or(limits.partner_default)
        .min(limits.partner_max);

    let candidates = match state
        .profiles
        .list_partners(course.as_deref(), limits.partner_max)
        .await
    {
        Ok(candidates) => candidates,
        Err(e) => return store_failure("Failed to query partners", e),
    };

    tracing::debug!(
        "Found {} partner candidates for {} (course: {:?})",
        candidates.len(),
        identity.uid,
        course
    );

    let filter = PartnerFilter {
        exclude_uid: Some(identity.uid.clone()),
        dismissed: query.dismissed.as_deref().map(csv_to_list).unwrap_or_default(),
        search: query.q.filter(|q| !q.trim().is_empty()),
        limit,
    };

    let result = state.matcher.rank_partners(&viewer, candidates, &filter);

    tracing::info!(
        "Returning {} partners for {} (from {} candidates)",
        result.partners.len(),
        identity.uid,
        result.total_candidates
    );

    HttpResponse::Ok().json(PartnerFeedResponse {
        partners: result.partners,
        total_candidates: result.total_candidates,
    })
}

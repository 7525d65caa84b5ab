// HTTP API tests against the in-memory collaborators

use actix_web::{http::StatusCode, test, web, App};
use jsonwebtoken::{encode, EncodingKey, Header};
use lionlink::core::Matcher;
use lionlink::routes::{self, AppState, FeedLimits};
use lionlink::services::identity::Claims;
use lionlink::services::{IdentityVerifier, MemoryLedger, MemoryStore, ProfileService, SessionService};
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &str = "api-test-secret";

fn create_state(debug_routes: bool) -> AppState {
    let store = Arc::new(MemoryStore::new());

    AppState {
        profiles: ProfileService::new(store.clone(), "users", None),
        sessions: SessionService::new(store.clone(), "sessions"),
        store,
        ledger: Arc::new(MemoryLedger::new()),
        verifier: Arc::new(IdentityVerifier::new(SECRET, "columbia.edu", true)),
        matcher: Matcher::with_default_weights(),
        limits: FeedLimits::default(),
        users_collection: "users".to_string(),
        debug_routes,
    }
}

fn bearer(uid: &str, email: &str) -> (&'static str, String) {
    let claims = Claims {
        sub: uid.to_string(),
        email: email.to_string(),
        email_verified: true,
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
        .expect("token");

    ("Authorization", format!("Bearer {}", token))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
                .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let app = app!(create_state(false));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_profile_requires_identity() {
    let app = app!(create_state(false));

    let req = test::TestRequest::get().uri("/api/v1/profile/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/profile/me")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status_code"], 401);
}

#[actix_web::test]
async fn test_non_university_email_rejected() {
    let app = app!(create_state(false));

    let req = test::TestRequest::get()
        .uri("/api/v1/profile/me")
        .insert_header(bearer("u1", "someone@gmail.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_profile_ensure_and_update() {
    let app = app!(create_state(false));

    let req = test::TestRequest::get()
        .uri("/api/v1/profile/me")
        .insert_header(bearer("u1", "amina.k@columbia.edu"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["displayName"], "Amina K");

    let req = test::TestRequest::put()
        .uri("/api/v1/profile/me")
        .insert_header(bearer("u1", "amina.k@columbia.edu"))
        .set_json(json!({
            "uid": "hijack",
            "major": "Computer Science",
            "enrolledCourses": "COMS W4701, COMS W3157",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["uid"], "u1");
    assert_eq!(body["major"], "Computer Science");
    assert_eq!(body["courses"], json!(["COMS W4701", "COMS W3157"]));
}

#[actix_web::test]
async fn test_blank_name_rejected() {
    let app = app!(create_state(false));

    let req = test::TestRequest::put()
        .uri("/api/v1/profile/me")
        .insert_header(bearer("u1", "amina.k@columbia.edu"))
        .set_json(json!({"name": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/v1/profile/me")
        .insert_header(bearer("u1", "amina.k@columbia.edu"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["displayName"], "Amina K");
}

#[actix_web::test]
async fn test_invalid_json_uses_error_shape() {
    let app = app!(create_state(false));

    let req = test::TestRequest::put()
        .uri("/api/v1/profile/me")
        .insert_header(bearer("u1", "amina.k@columbia.edu"))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
}

#[actix_web::test]
async fn test_partner_feed_after_seed() {
    let app = app!(create_state(true));

    let req = test::TestRequest::post().uri("/api/v1/debug/seed").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["seeded"], json!(["demo1", "demo2", "demo3"]));

    let me = bearer("me", "ps3358@columbia.edu");
    let req = test::TestRequest::put()
        .uri("/api/v1/profile/me")
        .insert_header(me.clone())
        .set_json(json!({"enrolledCourses": ["COMS W4701"], "studyStyle": ["pomodoro"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/partners?dismissed=demo2")
        .insert_header(me.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let partners = body["partners"].as_array().unwrap();
    assert_eq!(partners.len(), 1);
    assert_eq!(partners[0]["uid"], "demo1");
    assert_eq!(partners[0]["matchScore"], 87);

    // Empty course filter widens the feed to everyone
    let req = test::TestRequest::get()
        .uri("/api/v1/partners?course=&limit=2")
        .insert_header(me)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["partners"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_candidates"], 4);
}

#[actix_web::test]
async fn test_seed_hidden_without_debug_routes() {
    let app = app!(create_state(false));

    let req = test::TestRequest::post().uri("/api/v1/debug/seed").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_session_lifecycle() {
    let app = app!(create_state(false));
    let host = bearer("host", "jordan.r@columbia.edu");
    let me = bearer("me", "ps3358@columbia.edu");

    let req = test::TestRequest::post()
        .uri("/api/v1/sessions")
        .insert_header(host.clone())
        .set_json(json!({
            "courseCode": "COMS4701",
            "courseName": "Artificial Intelligence",
            "location": "Butler 209",
            "startAt": "2030-10-09T18:00:00Z",
            "endAt": "2030-10-09T20:00:00Z",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let session: Value = test::read_body_json(resp).await;
    let id = session["id"].as_str().unwrap().to_string();
    assert_eq!(session["interestedCount"], 0);
    assert_eq!(session["hostName"], "Jordan R");

    let req = test::TestRequest::put()
        .uri("/api/v1/profile/me")
        .insert_header(me.clone())
        .set_json(json!({"enrolledCourses": ["coms4701"]}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/interest", id))
        .insert_header(me.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["interested"], true);
    assert_eq!(body["interestedCount"], 1);

    // Setting the same value again changes nothing
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/sessions/{}/interest", id))
        .insert_header(me.clone())
        .set_json(json!({"value": true}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["interestedCount"], 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/sessions")
        .insert_header(me.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["firstName"], "Ps3358");
    let first = &body["sessions"][0];
    assert_eq!(first["id"], id.as_str());
    assert_eq!(first["recommended"], true);
    assert_eq!(first["isInterested"], true);
    assert_eq!(first["interestedCount"], 1);

    // Toggling back returns the counter to zero
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/interest", id))
        .insert_header(me)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["interested"], false);
    assert_eq!(body["interestedCount"], 0);
}

#[actix_web::test]
async fn test_session_validation_and_missing_session() {
    let app = app!(create_state(false));
    let me = bearer("me", "ps3358@columbia.edu");

    let req = test::TestRequest::post()
        .uri("/api/v1/sessions")
        .insert_header(me.clone())
        .set_json(json!({
            "courseCode": "COMS4701",
            "courseName": "Artificial Intelligence",
            "location": "Butler 209",
            "startAt": "2030-10-09T20:00:00Z",
            "endAt": "2030-10-09T18:00:00Z",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/sessions/nope/interest")
        .insert_header(me)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_score_endpoints() {
    let app = app!(create_state(false));

    let req = test::TestRequest::post()
        .uri("/api/v1/score/partner")
        .set_json(json!({
            "viewer": {"courses": ["COMS4701"], "tags": ["pomodoro"]},
            "candidate": {"courses": ["COMS4701"], "tags": ["pomodoro", "quiet"]},
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["score"], 87);
    assert_eq!(body["reasons"], json!(["1 shared course", "1 shared style tag"]));

    let req = test::TestRequest::post()
        .uri("/api/v1/score/partner")
        .set_json(json!({"viewer": {"courses": "oops"}, "candidate": null}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["score"], 35);

    let req = test::TestRequest::post()
        .uri("/api/v1/score/session")
        .set_json(json!({
            "viewer": {"courses": ["COMS4701"]},
            "session": {"courseCode": "COMS4701"},
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["score"], 70);
    assert_eq!(body["recommended"], true);
    assert_eq!(body["reasons"], json!(["In your courses"]));
}

use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use crate::cache::{KeyValueStore, RsvpCache};
use crate::config::Config;
use crate::errors::ApiError;
use crate::model::attendee::{AttendanceUpdate, Attendee, NewAttendee, StoredRsvp};
use crate::session::{SessionId, SessionRegistry};
use crate::store::RemoteStore;
use crate::utils::countdown::is_rsvp_deadline_passed;
use crate::utils::validation::validate_submission;

#[derive(Serialize, ToSchema)]
pub struct MyRsvpResponse {
    pub rsvp: StoredRsvp,
    #[schema(example = "SMK Plus Pelita Nusantara")]
    pub school_display: String,
    #[schema(example = "XII.RPL-1")]
    pub class_display: String,
}

#[derive(Serialize, ToSchema)]
pub struct SessionStatus {
    pub has_submitted: bool,
    /// Set once per session when an RSVP already exists
    #[schema(example = "/rsvp/me")]
    pub redirect_to: Option<String>,
}

const STATUS_PAGE: &str = "/rsvp/me";

fn ensure_open(config: &Config) -> Result<(), ApiError> {
    if is_rsvp_deadline_passed(&config.rsvp_deadline, Utc::now()) {
        return Err(ApiError::Closed);
    }
    Ok(())
}

fn my_rsvp_response(rsvp: &StoredRsvp) -> MyRsvpResponse {
    use crate::model::school::{class_display, school_display};

    MyRsvpResponse {
        rsvp: rsvp.clone(),
        school_display: school_display(&rsvp.data.school, rsvp.data.school_other.as_deref()),
        class_display: class_display(&rsvp.data.class, rsvp.data.class_other.as_deref()),
    }
}

/// Submit an RSVP
#[utoipa::path(
    post,
    path = "/api/rsvp",
    request_body = NewAttendee,
    responses(
        (status = 201, description = "RSVP stored", body = Attendee),
        (status = 400, description = "Invalid submission"),
        (status = 403, description = "RSVP closed"),
        (status = 503, description = "Could not submit RSVP, please try again", body = Object, example = json!({
            "error": "Could not submit RSVP, please try again",
            "retryable": true
        }))
    ),
    tag = "RSVP"
)]
#[instrument(name = "rsvp_submit", skip_all, fields(session = %session.0))]
pub async fn submit_rsvp(
    session: SessionId,
    sessions: web::Data<SessionRegistry>,
    store: web::Data<RemoteStore>,
    config: web::Data<Config>,
    payload: web::Json<NewAttendee>,
) -> Result<HttpResponse, ApiError> {
    ensure_open(&config)?;
    let submission = validate_submission(payload.into_inner())?;

    let client = store.client().map_err(|e| {
        warn!(error = %e, "RSVP submitted while store is unavailable");
        ApiError::Submit(e)
    })?;

    let attendee: Attendee = client.insert(submission).await.map_err(|e| {
        error!(error = %e, "Failed to insert attendee");
        ApiError::Submit(e)
    })?;

    let mut cache = sessions.rsvp_cache(&session);
    if !cache.save(StoredRsvp::from_attendee(&attendee, Utc::now())) {
        warn!(attendee_id = %attendee.id, "RSVP stored remotely but not cached");
    }

    info!(attendee_id = %attendee.id, "RSVP submitted");
    Ok(HttpResponse::Created().json(attendee))
}

/// This session's cached RSVP
#[utoipa::path(
    get,
    path = "/api/rsvp/me",
    responses(
        (status = 200, description = "Cached RSVP", body = MyRsvpResponse),
        (status = 404, description = "No RSVP cached for this session")
    ),
    tag = "RSVP"
)]
pub async fn my_rsvp(
    session: SessionId,
    sessions: web::Data<SessionRegistry>,
) -> Result<HttpResponse, ApiError> {
    let cache = sessions.rsvp_cache(&session);
    match cache.data() {
        Some(rsvp) => Ok(HttpResponse::Ok().json(my_rsvp_response(rsvp))),
        None => Err(ApiError::NotFound("No RSVP found for this session".into())),
    }
}

/// Change attendance for this session's RSVP
#[utoipa::path(
    put,
    path = "/api/rsvp/me",
    request_body = AttendanceUpdate,
    responses(
        (status = 200, description = "Attendance updated", body = MyRsvpResponse),
        (status = 404, description = "No RSVP cached for this session"),
        (status = 503, description = "Could not submit RSVP, please try again")
    ),
    tag = "RSVP"
)]
#[instrument(name = "rsvp_update", skip_all, fields(session = %session.0))]
pub async fn update_my_rsvp(
    session: SessionId,
    sessions: web::Data<SessionRegistry>,
    store: web::Data<RemoteStore>,
    config: web::Data<Config>,
    payload: web::Json<AttendanceUpdate>,
) -> Result<HttpResponse, ApiError> {
    ensure_open(&config)?;

    let mut cache = sessions.rsvp_cache(&session);
    let id = cache
        .data()
        .and_then(|r| r.data.id.clone())
        .ok_or_else(|| ApiError::NotFound("No RSVP found for this session".into()))?;

    let payload = payload.into_inner();
    let update = AttendanceUpdate::new(payload.is_attending, payload.reason);

    let client = store.client().map_err(ApiError::Submit)?;
    let row = client.update(&id, update).await.map_err(|e| {
        error!(error = %e, attendee_id = %id, "Failed to update attendance");
        ApiError::Submit(e)
    })?;

    info!(attendee_id = %id, is_attending = row.is_attending, "Attendance updated");
    Ok(HttpResponse::Ok().json(mirror_update(&mut cache, &row)))
}

/// Copies the updated row into the session cache. When the cache cannot be
/// written, the response is built from `row` so the caller still sees the
/// authoritative attendance.
fn mirror_update<S: KeyValueStore>(cache: &mut RsvpCache<S>, row: &Attendee) -> MyRsvpResponse {
    if cache.update_attendance(row.is_attending, row.reason.clone()) {
        if let Some(rsvp) = cache.data() {
            return my_rsvp_response(rsvp);
        }
    }

    warn!(attendee_id = %row.id, "Attendance updated remotely but not cached");
    let submitted_at = cache.data().map(|r| r.submitted_at).unwrap_or_else(Utc::now);
    my_rsvp_response(&StoredRsvp::from_attendee(row, submitted_at))
}

/// Start over: forget this session's RSVP locally
#[utoipa::path(
    delete,
    path = "/api/rsvp/me",
    responses((status = 204, description = "Local RSVP cleared")),
    tag = "RSVP"
)]
pub async fn clear_my_rsvp(
    session: SessionId,
    sessions: web::Data<SessionRegistry>,
) -> HttpResponse {
    sessions.rsvp_cache(&session).clear();
    HttpResponse::NoContent().finish()
}

/// Whether this session already responded, and where to send it once
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Session status", body = SessionStatus)),
    tag = "RSVP"
)]
pub async fn session_status(
    session: SessionId,
    sessions: web::Data<SessionRegistry>,
) -> HttpResponse {
    let has_submitted = sessions.rsvp_cache(&session).has_submitted();
    let redirect = sessions.take_auto_redirect(&session, has_submitted).await;

    HttpResponse::Ok().json(SessionStatus {
        has_submitted,
        redirect_to: redirect.then(|| STATUS_PAGE.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SESSION_COOKIE, session_middleware};
    use crate::store::MemoryStore;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{App, test};
    use std::time::Duration;

    fn open_config() -> Config {
        let mut config = Config::default();
        config.rsvp_deadline = (Utc::now() + chrono::Duration::days(30)).fixed_offset();
        config
    }

    macro_rules! rsvp_app {
        ($store:expr, $config:expr, $dir:expr) => {
            test::init_service(
                App::new()
                    .wrap(from_fn(session_middleware))
                    .app_data(web::Data::new($store))
                    .app_data(web::Data::new($config))
                    .app_data(web::Data::new(SessionRegistry::new(
                        $dir,
                        Duration::from_secs(60),
                    )))
                    .route("/api/session", web::get().to(session_status))
                    .route("/api/rsvp", web::post().to(submit_rsvp))
                    .service(
                        web::resource("/api/rsvp/me")
                            .route(web::get().to(my_rsvp))
                            .route(web::put().to(update_my_rsvp))
                            .route(web::delete().to(clear_my_rsvp)),
                    ),
            )
            .await
        };
    }

    fn submission() -> serde_json::Value {
        serde_json::json!({
            "name": "Maria",
            "school": "other",
            "school_other": "MAN 2",
            "class": "Lainnya",
            "class_other": "XI IPA",
            "is_attending": true
        })
    }

    fn cookie(id: &SessionId) -> Cookie<'static> {
        Cookie::new(SESSION_COOKIE, id.0.clone())
    }

    #[actix_web::test]
    async fn test_full_rsvp_flow() {
        let dir = tempfile::tempdir().unwrap();
        let app = rsvp_app!(RemoteStore::new(MemoryStore::new()), open_config(), dir.path());
        let session = SessionId::generate();

        // Nothing cached yet.
        let req = test::TestRequest::get().uri("/api/rsvp/me").cookie(cookie(&session)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        // Submit.
        let req = test::TestRequest::post()
            .uri("/api/rsvp")
            .cookie(cookie(&session))
            .set_json(submission())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Attendee = test::read_body_json(res).await;
        assert_eq!(created.school_other.as_deref(), Some("MAN 2"));

        // The session now reads its RSVP from the local cache.
        let req = test::TestRequest::get().uri("/api/rsvp/me").cookie(cookie(&session)).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["rsvp"]["id"], created.id.as_str());
        assert_eq!(body["school_display"], "MAN 2");
        assert_eq!(body["class_display"], "XI IPA");

        // Change of plans.
        let req = test::TestRequest::put()
            .uri("/api/rsvp/me")
            .cookie(cookie(&session))
            .set_json(serde_json::json!({ "is_attending": false, "reason": "sick" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["rsvp"]["isAttending"], false);
        assert_eq!(body["rsvp"]["reason"], "sick");

        // Start over.
        let req = test::TestRequest::delete().uri("/api/rsvp/me").cookie(cookie(&session)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
        let req = test::TestRequest::get().uri("/api/rsvp/me").cookie(cookie(&session)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_submit_without_store_is_retryable() {
        let dir = tempfile::tempdir().unwrap();
        let app = rsvp_app!(RemoteStore::Unavailable, open_config(), dir.path());
        let session = SessionId::generate();

        let req = test::TestRequest::post()
            .uri("/api/rsvp")
            .cookie(cookie(&session))
            .set_json(submission())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Could not submit RSVP, please try again");
        assert_eq!(body["retryable"], true);

        // Nothing was cached for the failed submission.
        let req = test::TestRequest::get().uri("/api/rsvp/me").cookie(cookie(&session)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_submit_rejects_invalid_payload() {
        let dir = tempfile::tempdir().unwrap();
        let app = rsvp_app!(RemoteStore::new(MemoryStore::new()), open_config(), dir.path());

        let mut payload = submission();
        payload["school_other"] = serde_json::Value::Null;
        let req = test::TestRequest::post().uri("/api/rsvp").set_json(payload).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_submit_after_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.rsvp_deadline = (Utc::now() - chrono::Duration::days(1)).fixed_offset();
        let app = rsvp_app!(RemoteStore::new(MemoryStore::new()), config, dir.path());

        let req = test::TestRequest::post().uri("/api/rsvp").set_json(submission()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_update_without_cached_rsvp() {
        let dir = tempfile::tempdir().unwrap();
        let app = rsvp_app!(RemoteStore::new(MemoryStore::new()), open_config(), dir.path());

        let req = test::TestRequest::put()
            .uri("/api/rsvp/me")
            .set_json(serde_json::json!({ "is_attending": false }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_session_status_redirects_once() {
        let dir = tempfile::tempdir().unwrap();
        let app = rsvp_app!(RemoteStore::new(MemoryStore::new()), open_config(), dir.path());
        let session = SessionId::generate();

        let req = test::TestRequest::get().uri("/api/session").cookie(cookie(&session)).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["has_submitted"], false);
        assert!(body["redirect_to"].is_null());

        let req = test::TestRequest::post()
            .uri("/api/rsvp")
            .cookie(cookie(&session))
            .set_json(submission())
            .to_request();
        let _ = test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/api/session").cookie(cookie(&session)).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["has_submitted"], true);
        assert_eq!(body["redirect_to"], "/rsvp/me");

        let req = test::TestRequest::get().uri("/api/session").cookie(cookie(&session)).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["redirect_to"].is_null());
    }

    #[actix_web::test]
    async fn test_update_response_follows_row_when_cache_write_fails() {
        use crate::cache::storage::MemoryStorage;
        use crate::constants::RSVP_DATA_KEY;
        use crate::model::attendee::tests::sample_attendee;

        let original = sample_attendee("Maria", true);
        let stored = StoredRsvp::from_attendee(&original, Utc::now());
        let encoded = serde_json::to_string(&stored).unwrap();

        // Room for the original entry only.
        let storage = MemoryStorage::with_quota(RSVP_DATA_KEY.len() + encoded.len() + 8);
        let mut cache = RsvpCache::new(storage);
        assert!(cache.save(stored.clone()));

        let mut row = sample_attendee("Maria", false);
        row.reason = Some("Ada acara keluarga di luar kota".repeat(4));
        row.updated_at = original.updated_at + chrono::Duration::minutes(5);

        let response = mirror_update(&mut cache, &row);
        assert!(!response.rsvp.data.is_attending);
        assert_eq!(response.rsvp.data.reason, row.reason);
        assert_eq!(response.rsvp.data.updated_at, Some(row.updated_at));
        assert_eq!(response.rsvp.submitted_at, stored.submitted_at);

        // The cache keeps its last durable state.
        assert_eq!(cache.data(), Some(&stored));
    }

    #[actix_web::test]
    async fn test_update_response_comes_from_cache_when_mirrored() {
        use crate::cache::storage::MemoryStorage;
        use crate::model::attendee::tests::sample_attendee;

        let original = sample_attendee("Maria", true);
        let mut cache = RsvpCache::new(MemoryStorage::new());
        assert!(cache.save(StoredRsvp::from_attendee(&original, Utc::now())));

        let row = sample_attendee("Maria", false);
        let response = mirror_update(&mut cache, &row);
        assert!(!response.rsvp.data.is_attending);
        assert_eq!(response.rsvp.data.reason.as_deref(), Some("sakit"));
        assert_eq!(cache.data().map(|r| &r.data), Some(&response.rsvp.data));
        assert_eq!(response.school_display, "SMK Plus Pelita Nusantara");
    }
}

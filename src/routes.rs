use crate::{
    api::{admin, event, rsvp},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;
use tracing::warn;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = 60_000 / requests_per_min as u64;
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish();

    match cfg {
        Some(cfg) => Governor::new(&cfg),
        None => {
            warn!(requests_per_min, "Invalid rate limit, using governor defaults");
            Governor::new(&GovernorConfig::default())
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let submit_limiter = Arc::new(build_limiter(config.rate_submit_per_min));
    let admin_limiter = Arc::new(build_limiter(config.rate_admin_per_min));

    // Admin session
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Public site
    cfg.service(
        web::scope(&config.api_prefix)
            .route("/event", web::get().to(event::event_info))
            .route("/schools", web::get().to(event::schools))
            .route("/session", web::get().to(rsvp::session_status))
            .service(
                web::resource("/rsvp")
                    .wrap(submit_limiter.clone())
                    .route(web::post().to(rsvp::submit_rsvp)),
            )
            // /rsvp/me
            .service(
                web::resource("/rsvp/me")
                    .wrap(submit_limiter)
                    .route(web::get().to(rsvp::my_rsvp))
                    .route(web::put().to(rsvp::update_my_rsvp))
                    .route(web::delete().to(rsvp::clear_my_rsvp)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope("/admin")
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(admin_limiter) // rate limiting
            .route("/attendees", web::get().to(admin::list_attendees))
            .route("/attendees/export", web::get().to(admin::export_attendees)),
    );
}

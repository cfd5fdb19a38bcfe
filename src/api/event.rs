use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Config;
use crate::constants::{EVENT_INFO, EventInfo, classes_for_school};
use crate::model::school::School;
use crate::utils::countdown::{
    CountdownTime, calculate_countdown, format_date, format_time, is_rsvp_deadline_passed,
};

#[derive(Serialize)]
pub struct EventResponse {
    pub event: &'static EventInfo,
    pub date: String,
    pub formatted_date: String,
    pub formatted_time: String,
    pub rsvp_deadline: String,
    pub rsvp_closed: bool,
    pub countdown: CountdownTime,
}

#[derive(Serialize, ToSchema)]
pub struct SchoolOption {
    #[schema(example = "penus")]
    pub value: String,
    #[schema(example = "SMK Plus Pelita Nusantara (Penus)")]
    pub label: String,
    #[schema(example = "Penus")]
    pub short_label: String,
    pub classes: Vec<String>,
}

/// Event details with a live countdown
#[utoipa::path(
    get,
    path = "/api/event",
    responses(
        (status = 200, description = "Event details", body = Object, example = json!({
            "event": { "title": "Celebrate Christmas" },
            "date": "2026-01-15T15:30:00+07:00",
            "formatted_date": "Kamis, 15 Januari 2026",
            "formatted_time": "15.30",
            "rsvp_closed": false,
            "countdown": { "days": 1, "hours": 1, "minutes": 1, "seconds": 1, "is_expired": false }
        }))
    ),
    tag = "Event"
)]
pub async fn event_info(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok().json(EventResponse {
        event: &EVENT_INFO,
        date: config.event_date.to_rfc3339(),
        formatted_date: format_date(&config.event_date),
        formatted_time: format_time(&config.event_date),
        rsvp_deadline: config.rsvp_deadline.to_rfc3339(),
        rsvp_closed: is_rsvp_deadline_passed(&config.rsvp_deadline, Utc::now()),
        countdown: calculate_countdown(&config.event_date),
    })
}

pub fn school_options() -> Vec<SchoolOption> {
    School::all()
        .map(|school| SchoolOption {
            value: school.to_string(),
            label: school.label().to_string(),
            short_label: school.short_label().to_string(),
            classes: classes_for_school(school)
                .iter()
                .map(|c| c.to_string())
                .collect(),
        })
        .collect()
}

/// Schools and the classes offered by each
#[utoipa::path(
    get,
    path = "/api/schools",
    responses((status = 200, description = "School options", body = [SchoolOption])),
    tag = "Event"
)]
pub async fn schools() -> impl Responder {
    HttpResponse::Ok().json(school_options())
}

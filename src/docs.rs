use crate::api::admin::AttendeeListResponse;
use crate::api::event::SchoolOption;
use crate::api::rsvp::{MyRsvpResponse, SessionStatus};
use crate::model::attendee::{
    AttendanceUpdate, Attendee, AttendeeFilter, NewAttendee, RsvpData, StoredRsvp,
};
use crate::models::{LoginReqDto, LoginResponse};
use crate::utils::countdown::CountdownTime;
use crate::utils::export_excel::ExportSummary;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RSVP Natal API",
        version = "1.0.0",
        description = r#"
## Christmas Celebration RSVP

Backend for the Christmas celebration invitation site shared by
**SMK Plus Pelita Nusantara** and **SMA Pesat**.

### Public site
- Event details with a live countdown to the celebration
- School and class options for the RSVP form
- Submit, view, update and forget the visitor's own RSVP

Each visitor is tracked by the `rsvp_session` cookie. The last submitted
RSVP is kept per session, so returning visitors see their status page.

### Committee
- Log in with an admin account
- List attendees with attendance, school and name filters
- Download the list as an Excel workbook

Admin endpoints accept `Authorization: Bearer <token>`, or the token
remembered in the session after login.
"#,
    ),
    paths(
        crate::api::event::event_info,
        crate::api::event::schools,

        crate::api::rsvp::submit_rsvp,
        crate::api::rsvp::my_rsvp,
        crate::api::rsvp::update_my_rsvp,
        crate::api::rsvp::clear_my_rsvp,
        crate::api::rsvp::session_status,

        crate::auth::handlers::login,
        crate::auth::handlers::logout,
        crate::api::admin::list_attendees,
        crate::api::admin::export_attendees
    ),
    components(
        schemas(
            Attendee,
            NewAttendee,
            AttendanceUpdate,
            AttendeeFilter,
            RsvpData,
            StoredRsvp,
            MyRsvpResponse,
            SessionStatus,
            SchoolOption,
            CountdownTime,
            LoginReqDto,
            LoginResponse,
            ExportSummary,
            AttendeeListResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Event", description = "Event details and form options"),
        (name = "RSVP", description = "Visitor RSVP APIs"),
        (name = "Admin", description = "Committee APIs"),
    )
)]
pub struct ApiDoc;

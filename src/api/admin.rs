use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::errors::ApiError;
use crate::model::attendee::{Attendee, AttendeeFilter};
use crate::store::RemoteStore;
use crate::utils::export_excel::{ExportSummary, build_workbook, default_filename, summarize};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Serialize, ToSchema)]
pub struct AttendeeListResponse {
    pub data: Vec<Attendee>,
    pub summary: ExportSummary,
}

async fn fetch_attendees(
    store: &RemoteStore,
    filter: &AttendeeFilter,
) -> Result<Vec<Attendee>, ApiError> {
    let client = store.client().map_err(ApiError::Store)?;
    client.list(filter).await.map_err(|e| {
        error!(error = %e, "Failed to list attendees");
        ApiError::Store(e)
    })
}

/// List attendees
#[utoipa::path(
    get,
    path = "/admin/attendees",
    params(AttendeeFilter),
    responses(
        (status = 200, description = "Attendees, newest first", body = AttendeeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Remote store unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_attendees(
    auth: AuthUser,
    store: web::Data<RemoteStore>,
    query: web::Query<AttendeeFilter>,
) -> Result<HttpResponse, ApiError> {
    let data = fetch_attendees(&store, &query).await?;
    info!(admin = %auth.username, count = data.len(), "Attendees listed");

    Ok(HttpResponse::Ok().json(AttendeeListResponse {
        summary: summarize(&data),
        data,
    }))
}

/// Download attendees as an `.xlsx` workbook
#[utoipa::path(
    get,
    path = "/admin/attendees/export",
    params(AttendeeFilter),
    responses(
        (status = 200, description = "Spreadsheet with data and summary sheets", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Remote store unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn export_attendees(
    auth: AuthUser,
    store: web::Data<RemoteStore>,
    query: web::Query<AttendeeFilter>,
) -> Result<HttpResponse, ApiError> {
    let data = fetch_attendees(&store, &query).await?;
    let now = Utc::now();

    let bytes = build_workbook(&data, now).map_err(|e| {
        error!(error = %e, "Failed to build workbook");
        ApiError::Export(e.to_string())
    })?;

    info!(admin = %auth.username, count = data.len(), "Attendees exported");

    Ok(HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(default_filename(now))],
        })
        .body(bytes))
}

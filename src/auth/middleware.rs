use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;
use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::session::{SessionId, SessionRegistry};

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(json!({ "error": message, "retryable": false }));
    req.into_response(resp.map_into_boxed_body())
}

/// Token stored in the visitor's session by a previous login.
fn session_token(req: &ServiceRequest) -> Option<String> {
    let id = req.extensions().get::<SessionId>().cloned()?;
    let sessions = req.app_data::<Data<SessionRegistry>>()?;
    sessions.admin_token(&id).get()
}

/// Requires an admin token, taken from `Authorization: Bearer` or, failing
/// that, from the session's stored admin token.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let token = match req.headers().get("Authorization") {
        Some(h) => {
            let header_value = h.to_str().map_err(|_| {
                actix_web::error::ErrorUnauthorized(
                    json!({"error": "Invalid Authorization header encoding"}),
                )
            })?;
            match header_value.strip_prefix("Bearer ") {
                Some(t) => t.to_string(),
                None => {
                    return Ok(unauthorized(
                        req,
                        "Authorization header must start with Bearer",
                    ));
                }
            }
        }
        None => match session_token(&req) {
            Some(t) => t,
            None => return Ok(unauthorized(req, "Missing Authorization header")),
        },
    };

    let claims = match verify_token(&token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "Rejected admin token");
            return Ok(unauthorized(req, "Invalid or expired token"));
        }
    };

    req.extensions_mut().insert(AuthUser {
        admin_id: claims.admin_id,
        username: claims.sub,
    });

    next.call(req).await
}

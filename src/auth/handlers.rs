use actix_web::{HttpResponse, web};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    auth::{jwt::generate_access_token, password::verify_password},
    config::Config,
    errors::ApiError,
    models::{LoginReqDto, LoginResponse},
    session::{SessionId, SessionRegistry},
    store::RemoteStore,
};

/// Admin login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "Remote store unavailable")
    ),
    tag = "Admin"
)]
#[instrument(
    name = "auth_login",
    skip(user, store, config, sessions, session),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<RemoteStore>,
    config: web::Data<Config>,
    sessions: web::Data<SessionRegistry>,
    session: SessionId,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.username.trim().is_empty() || user.password.is_empty() {
        return Err(ApiError::Validation("Username or password required".into()));
    }

    // 2️⃣ Fetch admin
    let client = store.client().map_err(ApiError::Store)?;
    let admin = match client.find_admin(user.username.trim()).await {
        Ok(Some(admin)) => admin,
        Ok(None) => {
            info!("Invalid credentials: admin not found");
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "Store error while fetching admin");
            return Err(ApiError::Store(e));
        }
    };

    // 3️⃣ Verify password
    if let Err(e) = verify_password(&user.password, &admin.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }
    debug!("Password verified");

    // 4️⃣ Issue token and remember it for this session
    let access_token = generate_access_token(
        &admin.id,
        &admin.username,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        ApiError::Internal
    })?;

    if !sessions.admin_token(&session).set(&access_token) {
        warn!("Admin token not persisted; bearer header still works");
    }

    info!("Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: config.access_token_ttl,
    }))
}

/// Admin logout: forgets the session's stored token.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out")),
    tag = "Admin"
)]
pub async fn logout(sessions: web::Data<SessionRegistry>, session: SessionId) -> HttpResponse {
    sessions.admin_token(&session).clear();
    HttpResponse::NoContent().finish()
}

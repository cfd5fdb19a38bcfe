//! Per-visitor session: a cookie id, the visitor's durable storage, and a
//! small in-memory context replacing page-global flags.

use std::path::PathBuf;
use std::time::Duration;

use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::error::ErrorInternalServerError;
use actix_web::middleware::Next;
use actix_web::web::Data;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{Ready, ready};
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tracing::debug;
use uuid::Uuid;

use crate::cache::{AdminTokenSlot, FileStorage, RsvpCache};

pub const SESSION_COOKIE: &str = "rsvp_session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    /// Only UUIDs are accepted; the id becomes a directory name.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw)
            .ok()
            .map(|id| SessionId(id.to_string()))
    }

    pub fn generate() -> Self {
        SessionId(Uuid::new_v4().to_string())
    }
}

impl FromRequest for SessionId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<SessionId>()
                .cloned()
                .ok_or_else(|| ErrorInternalServerError("Session missing")),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub has_auto_redirected: bool,
}

#[derive(Clone)]
pub struct SessionRegistry {
    contexts: Cache<String, SessionContext>,
    storage_root: PathBuf,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(storage_root: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            contexts: Cache::builder()
                .max_capacity(100_000)
                .time_to_idle(ttl)
                .build(),
            storage_root: storage_root.into(),
            ttl,
        }
    }

    pub fn storage(&self, id: &SessionId) -> FileStorage {
        FileStorage::new(self.storage_root.join(&id.0))
    }

    /// A freshly loaded view of the session's cached RSVP.
    pub fn rsvp_cache(&self, id: &SessionId) -> RsvpCache<FileStorage> {
        RsvpCache::open(self.storage(id))
    }

    pub fn admin_token(&self, id: &SessionId) -> AdminTokenSlot<FileStorage> {
        AdminTokenSlot::new(self.storage(id))
    }

    #[cfg(test)]
    pub async fn context(&self, id: &SessionId) -> SessionContext {
        self.contexts.get(&id.0).await.unwrap_or_default()
    }

    /// True the first time it is asked for a session that already has an
    /// RSVP, false afterwards. Check and set happen in one cache operation.
    pub async fn take_auto_redirect(&self, id: &SessionId, has_submitted: bool) -> bool {
        if !has_submitted {
            return false;
        }
        let result = self
            .contexts
            .entry(id.0.clone())
            .and_compute_with(|entry| {
                let context = entry.map(|e| e.into_value()).unwrap_or_default();
                let op = if context.has_auto_redirected {
                    Op::Nop
                } else {
                    Op::Put(SessionContext {
                        has_auto_redirected: true,
                    })
                };
                ready(op)
            })
            .await;
        matches!(result, CompResult::Inserted(_) | CompResult::ReplacedWith(_))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Attaches a [`SessionId`] to every request, issuing a cookie when the
/// visitor has none (or a malformed one).
pub async fn session_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let existing = req
        .cookie(SESSION_COOKIE)
        .and_then(|c| SessionId::parse(c.value()));

    let (id, fresh) = match existing {
        Some(id) => (id, false),
        None => (SessionId::generate(), true),
    };

    let max_age = req
        .app_data::<Data<SessionRegistry>>()
        .map(|r| r.ttl().as_secs() as i64);

    req.extensions_mut().insert(id.clone());
    let mut res = next.call(req).await?;

    if fresh {
        debug!(session = %id.0, "Issuing session cookie");
        let mut cookie = Cookie::build(SESSION_COOKIE, id.0)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish();
        if let Some(secs) = max_age {
            cookie.set_max_age(time::Duration::seconds(secs));
        }
        res.response_mut()
            .add_cookie(&cookie)
            .map_err(ErrorInternalServerError)?;
    }

    Ok(res)
}

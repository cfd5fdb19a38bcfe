use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use dotenvy::dotenv;
use tracing::warn;
use uuid::Uuid;

use crate::constants::{EVENT_DATE, RSVP_DEADLINE};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// `None` leaves the remote store unavailable.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Per-session durable storage
    pub session_storage_dir: PathBuf,
    pub session_ttl_secs: u64,

    pub event_date: DateTime<FixedOffset>,
    pub rsvp_deadline: DateTime<FixedOffset>,

    // Rate limiting
    pub rate_submit_per_min: u32,
    pub rate_login_per_min: u32,
    pub rate_admin_per_min: u32,

    pub api_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            database_url: None,
            db_max_connections: 5,
            jwt_secret: Uuid::new_v4().to_string(),
            access_token_ttl: 8 * 3600,
            session_storage_dir: PathBuf::from("data/sessions"),
            session_ttl_secs: 30 * 86400,
            event_date: parse_date(EVENT_DATE),
            rsvp_deadline: parse_date(RSVP_DEADLINE),
            rate_submit_per_min: 30,
            rate_login_per_min: 10,
            rate_admin_per_min: 300,
            api_prefix: "/api".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("JWT_SECRET is not set; admin tokens will not survive a restart");
                defaults.jwt_secret
            }
        };

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            jwt_secret,
            access_token_ttl: env_or("ACCESS_TOKEN_TTL", defaults.access_token_ttl),
            session_storage_dir: env::var("SESSION_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_storage_dir),
            session_ttl_secs: env_or("SESSION_TTL", defaults.session_ttl_secs),
            event_date: env_date("EVENT_DATE", defaults.event_date),
            rsvp_deadline: env_date("RSVP_DEADLINE", defaults.rsvp_deadline),
            rate_submit_per_min: env_or("RATE_SUBMIT_PER_MIN", defaults.rate_submit_per_min),
            rate_login_per_min: env_or("RATE_LOGIN_PER_MIN", defaults.rate_login_per_min),
            rate_admin_per_min: env_or("RATE_ADMIN_PER_MIN", defaults.rate_admin_per_min),
            api_prefix: env::var("API_PREFIX").unwrap_or(defaults.api_prefix),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring unparsable setting");
            default
        }),
        Err(_) => default,
    }
}

fn env_date(key: &str, default: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    match env::var(key) {
        Ok(raw) => DateTime::parse_from_rfc3339(&raw).unwrap_or_else(|e| {
            warn!(key, value = %raw, error = %e, "Ignoring unparsable date");
            default
        }),
        Err(_) => default,
    }
}

fn parse_date(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).expect("built-in event dates are valid RFC 3339")
}

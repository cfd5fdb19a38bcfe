use sqlx::mysql::MySqlPoolOptions;
use tracing::{info, warn};

use crate::config::Config;
use crate::store::{MySqlStore, RemoteStore};

/// Builds the remote store. Missing or unusable credentials leave the site
/// running with [`RemoteStore::Unavailable`].
pub fn init_store(config: &Config) -> RemoteStore {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL is not set; RSVP submissions are disabled");
        return RemoteStore::Unavailable;
    };

    // Connections are opened on first use so a database outage at boot
    // only fails individual requests.
    match MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_lazy(database_url)
    {
        Ok(pool) => {
            info!("Remote store configured");
            RemoteStore::new(MySqlStore::new(pool))
        }
        Err(e) => {
            warn!(error = %e, "Invalid DATABASE_URL; RSVP submissions are disabled");
            RemoteStore::Unavailable
        }
    }
}

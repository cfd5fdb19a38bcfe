use chrono::{Duration, Utc};
use tracing::{debug, error};

use crate::cache::storage::KeyValueStore;
use crate::constants::{ADMIN_TOKEN_KEY, RSVP_DATA_KEY};
use crate::model::attendee::StoredRsvp;
use crate::model::school::{class_display, school_display};

/// Single-record mirror of the session's own RSVP.
///
/// Storage failures never escape: reads degrade to "no record", writes are
/// logged and leave the in-memory state untouched.
pub struct RsvpCache<S> {
    storage: S,
    data: Option<StoredRsvp>,
    loaded: bool,
}

impl<S: KeyValueStore> RsvpCache<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            data: None,
            loaded: false,
        }
    }

    /// Convenience for the common "construct then load" sequence.
    pub fn open(storage: S) -> Self {
        let mut cache = Self::new(storage);
        cache.load();
        cache
    }

    pub fn load(&mut self) {
        match self.storage.get_item(RSVP_DATA_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<StoredRsvp>(&raw) {
                Ok(stored) => self.data = Some(stored),
                Err(e) => error!(error = %e, "Failed to parse cached RSVP data"),
            },
            Ok(None) => debug!("No cached RSVP data"),
            Err(e) => error!(error = %e, "Failed to load cached RSVP data"),
        }
        self.loaded = true;
    }

    /// Returns whether the record reached durable storage.
    pub fn save(&mut self, record: StoredRsvp) -> bool {
        let encoded = match serde_json::to_string(&record) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Failed to encode RSVP data");
                return false;
            }
        };

        match self.storage.set_item(RSVP_DATA_KEY, &encoded) {
            Ok(()) => {
                self.data = Some(record);
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to save RSVP data");
                false
            }
        }
    }

    /// No-op when nothing is cached.
    pub fn update_attendance(&mut self, is_attending: bool, reason: Option<String>) -> bool {
        let Some(current) = self.data.as_ref() else {
            return false;
        };

        let previous = current.last_touched();
        let mut updated_at = Utc::now();
        if updated_at <= previous {
            updated_at = previous + Duration::milliseconds(1);
        }

        let mut updated = current.clone();
        updated.data.is_attending = is_attending;
        updated.data.reason = if is_attending { None } else { reason };
        updated.data.updated_at = Some(updated_at);

        self.save(updated)
    }

    pub fn clear(&mut self) {
        match self.storage.remove_item(RSVP_DATA_KEY) {
            Ok(()) => self.data = None,
            Err(e) => error!(error = %e, "Failed to clear RSVP data"),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn data(&self) -> Option<&StoredRsvp> {
        self.data.as_ref()
    }

    pub fn has_submitted(&self) -> bool {
        self.data.is_some()
    }

    pub fn school_display(&self) -> String {
        self.data
            .as_ref()
            .map(|d| school_display(&d.data.school, d.data.school_other.as_deref()))
            .unwrap_or_default()
    }

    pub fn class_display(&self) -> String {
        self.data
            .as_ref()
            .map(|d| class_display(&d.data.class, d.data.class_other.as_deref()))
            .unwrap_or_default()
    }
}

/// The `christmas_admin_token` entry of a session's storage.
pub struct AdminTokenSlot<S> {
    storage: S,
}

impl<S: KeyValueStore> AdminTokenSlot<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn get(&self) -> Option<String> {
        match self.storage.get_item(ADMIN_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                error!(error = %e, "Failed to read admin token");
                None
            }
        }
    }

    pub fn set(&self, token: &str) -> bool {
        match self.storage.set_item(ADMIN_TOKEN_KEY, token) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to store admin token");
                false
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(ADMIN_TOKEN_KEY) {
            error!(error = %e, "Failed to clear admin token");
        }
    }
}

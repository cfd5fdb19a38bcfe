//! Remote attendee store.
//!
//! Handlers only ever see [`RemoteStore`], which is either a live client or
//! explicitly [`RemoteStore::Unavailable`] when no credentials were
//! configured.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::model::admin_user::AdminUser;
use crate::model::attendee::{AttendanceUpdate, Attendee, AttendeeFilter, NewAttendee};

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[cfg(test)]
pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[async_trait]
pub trait AttendeeStore: Send + Sync {
    /// Stores a new row and returns it with its assigned id and timestamps.
    async fn insert(&self, new: NewAttendee) -> Result<Attendee, StoreError>;

    /// Changes attendance; `updated_at` never moves backwards.
    async fn update(&self, id: &str, update: AttendanceUpdate) -> Result<Attendee, StoreError>;

    /// Rows matching `filter`, newest first.
    async fn list(&self, filter: &AttendeeFilter) -> Result<Vec<Attendee>, StoreError>;

    async fn find_admin(&self, username: &str) -> Result<Option<AdminUser>, StoreError>;
}

#[derive(Clone)]
pub enum RemoteStore {
    Available(Arc<dyn AttendeeStore>),
    Unavailable,
}

impl RemoteStore {
    pub fn new(store: impl AttendeeStore + 'static) -> Self {
        RemoteStore::Available(Arc::new(store))
    }

    pub fn client(&self) -> Result<&dyn AttendeeStore, StoreError> {
        match self {
            RemoteStore::Available(store) => Ok(store.as_ref()),
            RemoteStore::Unavailable => Err(StoreError::Unavailable),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, RemoteStore::Available(_))
    }
}

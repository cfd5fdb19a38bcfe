use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::model::admin_user::AdminUser;
use crate::model::attendee::{AttendanceUpdate, Attendee, AttendeeFilter, NewAttendee};
use crate::store::AttendeeStore;

/// Process-local store with the same contract as [`super::MySqlStore`], for tests.
#[derive(Default)]
pub struct MemoryStore {
    attendees: Mutex<Vec<Attendee>>,
    admins: Mutex<Vec<AdminUser>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin(self, username: &str, password_hash: &str) -> Self {
        self.admins
            .lock()
            .expect("memory store poisoned")
            .push(AdminUser {
                id: Uuid::new_v4().to_string(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            });
        self
    }
}

#[async_trait]
impl AttendeeStore for MemoryStore {
    async fn insert(&self, new: NewAttendee) -> Result<Attendee, StoreError> {
        let now = Utc::now();
        let attendee = Attendee {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            school: new.school,
            school_other: new.school_other,
            class: new.class,
            class_other: new.class_other,
            is_attending: new.is_attending,
            reason: if new.is_attending { None } else { new.reason },
            created_at: now,
            updated_at: now,
        };

        self.attendees
            .lock()
            .expect("memory store poisoned")
            .push(attendee.clone());
        Ok(attendee)
    }

    async fn update(&self, id: &str, update: AttendanceUpdate) -> Result<Attendee, StoreError> {
        let mut attendees = self.attendees.lock().expect("memory store poisoned");
        let attendee = attendees
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let update = AttendanceUpdate::new(update.is_attending, update.reason);
        attendee.is_attending = update.is_attending;
        attendee.reason = update.reason;
        attendee.updated_at = Utc::now().max(attendee.updated_at);
        Ok(attendee.clone())
    }

    async fn list(&self, filter: &AttendeeFilter) -> Result<Vec<Attendee>, StoreError> {
        let attendees = self.attendees.lock().expect("memory store poisoned");
        let mut rows: Vec<Attendee> = attendees
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_admin(&self, username: &str) -> Result<Option<AdminUser>, StoreError> {
        let admins = self.admins.lock().expect("memory store poisoned");
        Ok(admins.iter().find(|a| a.username == username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_attendee(name: &str, is_attending: bool) -> NewAttendee {
        NewAttendee {
            name: name.to_string(),
            school: "pesat".to_string(),
            school_other: None,
            class: "X.IPA-1".to_string(),
            class_other: None,
            is_attending,
            reason: Some("acara keluarga".to_string()),
        }
    }

    #[actix_web::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let row = store.insert(new_attendee("Maria", true)).await.unwrap();

        assert!(!row.id.is_empty());
        assert_eq!(row.created_at, row.updated_at);
        assert_eq!(row.reason, None);
    }

    #[actix_web::test]
    async fn test_update_flips_attendance_and_keeps_timestamps_monotonic() {
        let store = MemoryStore::new();
        let row = store.insert(new_attendee("Maria", true)).await.unwrap();

        let updated = store
            .update(&row.id, AttendanceUpdate::new(false, Some("sick".into())))
            .await
            .unwrap();
        assert!(!updated.is_attending);
        assert_eq!(updated.reason.as_deref(), Some("sick"));
        assert!(updated.updated_at >= row.updated_at);
        assert_eq!(updated.created_at, row.created_at);
    }

    #[actix_web::test]
    async fn test_update_unknown_id() {
        let store = MemoryStore::new();
        let err = store
            .update("missing", AttendanceUpdate::new(true, None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "missing"));
    }

    #[actix_web::test]
    async fn test_list_applies_filter() {
        let store = MemoryStore::new();
        store.insert(new_attendee("Maria", true)).await.unwrap();
        store.insert(new_attendee("Yohanes", false)).await.unwrap();

        let all = store.list(&AttendeeFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let absent = store
            .list(&AttendeeFilter {
                attending: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(absent.len(), 1);
        assert_eq!(absent[0].name, "Yohanes");
    }

    #[actix_web::test]
    async fn test_find_admin() {
        let store = MemoryStore::new().with_admin("panitia", "hash");
        assert!(store.find_admin("panitia").await.unwrap().is_some());
        assert!(store.find_admin("someone").await.unwrap().is_none());
    }
}

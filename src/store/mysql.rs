use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::model::admin_user::AdminUser;
use crate::model::attendee::{AttendanceUpdate, Attendee, AttendeeFilter, NewAttendee};
use crate::store::AttendeeStore;

const ATTENDEE_COLUMNS: &str = r#"
    id, name, school, school_other, `class`, class_other,
    is_attending, reason, created_at, updated_at
"#;

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: &str) -> Result<Attendee, StoreError> {
        let sql = format!("SELECT {} FROM attendees WHERE id = ?", ATTENDEE_COLUMNS);
        sqlx::query_as::<_, Attendee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl AttendeeStore for MySqlStore {
    #[instrument(name = "store_insert", skip(self, new), fields(school = %new.school))]
    async fn insert(&self, new: NewAttendee) -> Result<Attendee, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let reason = if new.is_attending { None } else { new.reason };

        sqlx::query(
            r#"
            INSERT INTO attendees
            (id, name, school, school_other, `class`, class_other, is_attending, reason, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.school)
        .bind(&new.school_other)
        .bind(&new.class)
        .bind(&new.class_other)
        .bind(new.is_attending)
        .bind(&reason)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(attendee_id = %id, "Attendee inserted");
        self.fetch(&id).await
    }

    #[instrument(name = "store_update", skip(self, update))]
    async fn update(&self, id: &str, update: AttendanceUpdate) -> Result<Attendee, StoreError> {
        let update = AttendanceUpdate::new(update.is_attending, update.reason);

        // MySQL reports 0 affected rows for no-op updates, so existence is
        // checked by reading the row back.
        sqlx::query(
            r#"
            UPDATE attendees
            SET is_attending = ?, reason = ?, updated_at = GREATEST(?, updated_at)
            WHERE id = ?
            "#,
        )
        .bind(update.is_attending)
        .bind(&update.reason)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.fetch(id).await
    }

    #[instrument(name = "store_list", skip(self))]
    async fn list(&self, filter: &AttendeeFilter) -> Result<Vec<Attendee>, StoreError> {
        let mut conditions = Vec::new();
        if filter.attending.is_some() {
            conditions.push("is_attending = ?");
        }
        if filter.school.is_some() {
            conditions.push("school = ?");
        }
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()));
        if search.is_some() {
            conditions.push("LOWER(name) LIKE ?");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM attendees {} ORDER BY created_at DESC",
            ATTENDEE_COLUMNS, where_clause
        );

        let mut query = sqlx::query_as::<_, Attendee>(&sql);
        if let Some(attending) = filter.attending {
            query = query.bind(attending);
        }
        if let Some(school) = &filter.school {
            query = query.bind(school);
        }
        if let Some(search) = &search {
            query = query.bind(search);
        }

        let rows = query.fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "Attendees listed");
        Ok(rows)
    }

    async fn find_admin(&self, username: &str) -> Result<Option<AdminUser>, StoreError> {
        let admin = sqlx::query_as::<_, AdminUser>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM admin_users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }
}

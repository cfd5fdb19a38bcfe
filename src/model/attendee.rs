use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "9b2f0c3e-4a57-4d7e-9a43-1f0f6f0d2b8e",
        "name": "Maria",
        "school": "penus",
        "school_other": null,
        "class": "XII.RPL-1",
        "class_other": null,
        "is_attending": true,
        "reason": null,
        "created_at": "2025-12-01T08:00:00Z",
        "updated_at": "2025-12-01T08:00:00Z"
    })
)]
pub struct Attendee {
    pub id: String,
    pub name: String,
    pub school: String,
    pub school_other: Option<String>,
    pub class: String,
    pub class_other: Option<String>,
    pub is_attending: bool,
    pub reason: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. The store assigns `id` and both timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewAttendee {
    #[schema(example = "Maria")]
    pub name: String,
    #[schema(example = "penus")]
    pub school: String,
    #[serde(default)]
    pub school_other: Option<String>,
    #[schema(example = "XII.RPL-1")]
    pub class: String,
    #[serde(default)]
    pub class_other: Option<String>,
    pub is_attending: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceUpdate {
    pub is_attending: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl AttendanceUpdate {
    /// A reason is only kept for people who are not coming.
    pub fn new(is_attending: bool, reason: Option<String>) -> Self {
        let reason = if is_attending {
            None
        } else {
            reason.filter(|r| !r.trim().is_empty())
        };
        Self {
            is_attending,
            reason,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AttendeeFilter {
    /// Only attendees with this attendance flag
    pub attending: Option<bool>,
    /// School code (`penus`, `pesat`, `other`)
    pub school: Option<String>,
    /// Case-insensitive match on name
    pub search: Option<String>,
}

impl AttendeeFilter {
    pub fn matches(&self, attendee: &Attendee) -> bool {
        if let Some(attending) = self.attending {
            if attendee.is_attending != attending {
                return false;
            }
        }
        if let Some(school) = &self.school {
            if &attendee.school != school {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty()
                && !attendee
                    .name
                    .to_lowercase()
                    .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Attendee as mirrored into the session's local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RsvpData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub school: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_other: Option<String>,
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_other: Option<String>,
    pub is_attending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredRsvp {
    #[serde(flatten)]
    pub data: RsvpData,
    /// Client-side submission time, unrelated to the store's timestamps.
    #[schema(value_type = String, format = "date-time")]
    pub submitted_at: DateTime<Utc>,
}

impl StoredRsvp {
    pub fn from_attendee(attendee: &Attendee, submitted_at: DateTime<Utc>) -> Self {
        Self {
            data: RsvpData {
                id: Some(attendee.id.clone()),
                name: attendee.name.clone(),
                school: attendee.school.clone(),
                school_other: attendee.school_other.clone(),
                class: attendee.class.clone(),
                class_other: attendee.class_other.clone(),
                is_attending: attendee.is_attending,
                reason: attendee.reason.clone(),
                created_at: Some(attendee.created_at),
                updated_at: Some(attendee.updated_at),
            },
            submitted_at,
        }
    }

    /// Most recent timestamp known for this record.
    pub fn last_touched(&self) -> DateTime<Utc> {
        self.data
            .updated_at
            .or(self.data.created_at)
            .map_or(self.submitted_at, |t| t.max(self.submitted_at))
    }
}

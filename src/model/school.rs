use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::constants::CLASS_OTHER;

/// Institutions an attendee can pick from. Stored as the lowercase code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, Display,
    AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum School {
    Penus,
    Pesat,
    Other,
}

impl School {
    /// Label used in the exported spreadsheet and the school picker.
    pub fn label(self) -> &'static str {
        match self {
            School::Penus => "SMK Plus Pelita Nusantara (Penus)",
            School::Pesat => "SMA Plus PGRI Cibinong (Pesat)",
            School::Other => "Lainnya",
        }
    }

    /// Plain institution name, as shown back to the attendee.
    pub fn display_name(self) -> &'static str {
        match self {
            School::Penus => "SMK Plus Pelita Nusantara",
            School::Pesat => "SMA Plus PGRI Cibinong",
            School::Other => "Lainnya",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            School::Penus => "Penus",
            School::Pesat => "Pesat",
            School::Other => "Lainnya",
        }
    }

    pub fn all() -> impl Iterator<Item = School> {
        School::iter()
    }
}

fn override_or_other(other: Option<&str>) -> String {
    match other {
        Some(o) if !o.is_empty() => o.to_string(),
        _ => "Lainnya".to_string(),
    }
}

/// Human readable school name. Unknown codes are returned unchanged.
pub fn school_display(school: &str, school_other: Option<&str>) -> String {
    match school.parse::<School>() {
        Ok(School::Other) => override_or_other(school_other),
        Ok(known) => known.display_name().to_string(),
        Err(_) => school.to_string(),
    }
}

/// Same as [`school_display`] but with the long export label.
pub fn school_export_label(school: &str, school_other: Option<&str>) -> String {
    match school.parse::<School>() {
        Ok(School::Other) => override_or_other(school_other),
        Ok(known) => known.label().to_string(),
        Err(_) => school.to_string(),
    }
}

pub fn class_display(class: &str, class_other: Option<&str>) -> String {
    if class == CLASS_OTHER {
        override_or_other(class_other)
    } else {
        class.to_string()
    }
}

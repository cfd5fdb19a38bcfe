use crate::constants::{CLASS_OTHER, classes_for_school};
use crate::errors::ApiError;
use crate::model::attendee::NewAttendee;
use crate::model::school::School;

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Checks a submission and returns it normalized: surrounding whitespace
/// removed, overrides kept only where they apply, reason only when absent.
pub fn validate_submission(input: NewAttendee) -> Result<NewAttendee, ApiError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Nama wajib diisi".into()));
    }

    let school: School = input
        .school
        .parse()
        .map_err(|_| ApiError::Validation(format!("Sekolah tidak dikenal: {}", input.school)))?;

    let school_other = if school == School::Other {
        let other = trimmed(input.school_other);
        if other.is_none() {
            return Err(ApiError::Validation("Nama sekolah wajib diisi".into()));
        }
        other
    } else {
        None
    };

    if !classes_for_school(school).contains(&input.class.as_str()) {
        return Err(ApiError::Validation(format!(
            "Kelas {} tidak tersedia untuk {}",
            input.class,
            school.short_label()
        )));
    }

    let class_other = if input.class == CLASS_OTHER {
        let other = trimmed(input.class_other);
        if other.is_none() {
            return Err(ApiError::Validation("Kelas wajib diisi".into()));
        }
        other
    } else {
        None
    };

    let reason = if input.is_attending {
        None
    } else {
        trimmed(input.reason)
    };

    Ok(NewAttendee {
        name,
        school: school.to_string(),
        school_other,
        class: input.class,
        class_other,
        is_attending: input.is_attending,
        reason,
    })
}

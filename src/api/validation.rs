use super::ApiError;
use crate::constants::coordinates::MAX_ABS_VALUE;
use crate::db::repositories::parking_spot::round_coordinate;

/// A required text field: present and not blank. Returns the trimmed value.
pub fn require_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ApiError::validation(format!("{field} is required"))),
    }
}

/// Passwords are taken verbatim; only presence is checked here.
pub fn require_password(value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::validation("password is required")),
    }
}

/// An optional field being changed must not be blanked if the column is mandatory.
pub fn non_blank(value: Option<String>, field: &str) -> Result<Option<String>, ApiError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(ApiError::validation(format!("{field} cannot be empty")))
        }
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

pub fn require_id(value: Option<i32>, field: &str) -> Result<i32, ApiError> {
    let id = value.ok_or_else(|| ApiError::validation(format!("{field} is required")))?;
    validate_id(id, field)
}

pub fn validate_id(id: i32, field: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {field}: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Coordinates must fit `decimal(9, 6)` after rounding. Returns the rounded value.
pub fn require_coordinate(value: Option<f64>, field: &str) -> Result<f64, ApiError> {
    let raw = value.ok_or_else(|| ApiError::validation(format!("{field} is required")))?;
    let v = round_coordinate(raw);
    if !v.is_finite() || v.abs() >= MAX_ABS_VALUE {
        return Err(ApiError::validation(format!(
            "Invalid {field}: {raw}. Must have at most 3 integer digits"
        )));
    }
    Ok(v)
}

use crate::error::{Error, Result};

const MAX_NAME_LEN: usize = 255;

/// Trims a required name and rejects empty or malformed values.
pub fn normalize_name(value: &str, field: &str) -> Result<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(Error::validation(format!(
            "{field} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }

    const INVALID_CHARS: &[char] = &['\0', '\n', '\r'];
    if value.chars().any(|c| INVALID_CHARS.contains(&c)) {
        return Err(Error::validation(format!(
            "{field} contains invalid characters"
        )));
    }

    Ok(value.to_string())
}

/// Trims optional free text; blank input is stored as NULL.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

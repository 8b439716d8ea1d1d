//! Input checks shared by the services.
//!
//! HTTP DTOs reject malformed payloads early; these functions are the last
//! line before the database and also guard callers that bypass the API
//! (the admin CLI seed, for one).

use crate::error::AppError;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// CAS registry number: 2-7 digits, 2 digits, 1 check digit.
pub static CAS_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2,7}-\d{2}-\d$").unwrap());

/// Trims a display name and rejects it when nothing is left.
///
/// # Errors
///
/// Returns [`AppError::Validation`] naming `field` when the name is blank.
pub fn normalize_name(field: &str, raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(
            format!("{} is required", field),
            json!({ "field": field }),
        ));
    }
    Ok(trimmed.to_string())
}

/// Accepts finite, non-negative quantities (concentrations, parts, ceilings).
///
/// Values above 1 are allowed for concentrations; they are flagged, not rejected.
pub fn validate_quantity(field: &str, value: f64) -> Result<f64, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::bad_request(
            format!("{} must be a finite, non-negative number", field),
            json!({ "field": field, "value": value.to_string() }),
        ));
    }
    Ok(value)
}

/// Record ids are positive.
pub fn validate_id(field: &str, id: i64) -> Result<i64, AppError> {
    if id <= 0 {
        return Err(AppError::bad_request(
            format!("{} must be a positive id", field),
            json!({ "field": field, "value": id }),
        ));
    }
    Ok(id)
}

/// Trims a CAS number; blank means "none".
///
/// # Errors
///
/// Returns [`AppError::Validation`] when a non-blank value is not shaped
/// like `7732-18-5`.
pub fn normalize_cas_number(raw: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(trimmed) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if !CAS_NUMBER_REGEX.is_match(trimmed) {
        return Err(AppError::bad_request(
            "CAS number must look like 1234567-12-3",
            json!({ "field": "casNumber", "value": trimmed }),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_trims() {
        assert_eq!(normalize_name("name", "  Rose Absolute ").unwrap(), "Rose Absolute");
    }

    #[test]
    fn test_normalize_name_rejects_blank() {
        let err = normalize_name("name", "   ").unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity("parts", 0.0).unwrap(), 0.0);
        assert_eq!(validate_quantity("concentration", 1.5).unwrap(), 1.5);
        assert!(validate_quantity("parts", -0.1).is_err());
        assert!(validate_quantity("parts", f64::NAN).is_err());
        assert!(validate_quantity("parts", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("allergenId", 1).is_ok());
        assert!(validate_id("allergenId", 0).is_err());
        assert!(validate_id("allergenId", -4).is_err());
    }

    #[test]
    fn test_cas_number_accepts_known_formats() {
        assert_eq!(
            normalize_cas_number(Some(" 78-70-6 ")).unwrap().as_deref(),
            Some("78-70-6")
        );
        assert!(normalize_cas_number(Some("5989-27-5")).unwrap().is_some());
        assert!(normalize_cas_number(Some("1234567-12-3")).unwrap().is_some());
    }

    #[test]
    fn test_cas_number_blank_is_none() {
        assert_eq!(normalize_cas_number(None).unwrap(), None);
        assert_eq!(normalize_cas_number(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_cas_number_rejects_bad_shapes() {
        assert!(normalize_cas_number(Some("7-70-6")).is_err());
        assert!(normalize_cas_number(Some("78706")).is_err());
        assert!(normalize_cas_number(Some("78-70-66")).is_err());
        assert!(normalize_cas_number(Some("ab-cd-e")).is_err());
    }
}

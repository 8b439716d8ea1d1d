//! DTOs for allergen endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use validator::Validate;

use crate::domain::entities::{Allergen, AllergenPatch};
use crate::domain::percent::{DISPLAY_DECIMALS, format_percent_display};

/// Request body for `POST /api/allergens`.
///
/// `maxConcentration` may be a number or numeric text; the CAS number is
/// checked by the service (blank means none).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAllergenRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 32))]
    pub cas_number: Option<String>,

    #[serde(default, deserialize_with = "super::number::optional")]
    #[validate(range(min = 0.0))]
    pub max_concentration: Option<f64>,
}

/// Request body for `PATCH /api/allergens/{id}`.
///
/// All fields are optional; only provided fields are changed.
///
/// - **Absent** → leave unchanged
/// - **`null`** → clear (`casNumber`, `maxConcentration`)
/// - **Value** → set
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAllergenRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub cas_number: Option<Option<String>>,

    #[serde(default, deserialize_with = "super::number::double_option")]
    pub max_concentration: Option<Option<f64>>,
}

impl From<UpdateAllergenRequest> for AllergenPatch {
    fn from(r: UpdateAllergenRequest) -> Self {
        AllergenPatch {
            name: r.name,
            cas_number: r.cas_number,
            max_concentration: r.max_concentration,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergenItem {
    pub id: i64,
    pub name: String,
    pub cas_number: Option<String>,
    pub max_concentration: Option<f64>,
    /// `maxConcentration` as a percentage, or an em-dash when unset.
    pub max_percent: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Allergen> for AllergenItem {
    fn from(a: Allergen) -> Self {
        AllergenItem {
            max_percent: format_percent_display(a.max_concentration, DISPLAY_DECIMALS),
            id: a.id,
            name: a.name,
            cas_number: a.cas_number,
            max_concentration: a.max_concentration,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AllergenListResponse {
    pub items: Vec<AllergenItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_accepts_text_ceiling() {
        let req: CreateAllergenRequest =
            serde_json::from_str(r#"{"name": "Linalool", "maxConcentration": "0.001"}"#).unwrap();

        assert_eq!(req.max_concentration, Some(0.001));
        assert!(req.cas_number.is_none());
    }

    #[test]
    fn test_create_rejects_negative_ceiling() {
        let req: CreateAllergenRequest =
            serde_json::from_str(r#"{"name": "Linalool", "maxConcentration": -0.1}"#).unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_null_clears_fields() {
        let req: UpdateAllergenRequest =
            serde_json::from_str(r#"{"casNumber": null, "maxConcentration": null}"#).unwrap();
        let patch = AllergenPatch::from(req);

        assert_eq!(patch.name, None);
        assert_eq!(patch.cas_number, Some(None));
        assert_eq!(patch.max_concentration, Some(None));
    }

    #[test]
    fn test_update_absent_fields_are_untouched() {
        let req: UpdateAllergenRequest = serde_json::from_str(r#"{"name": "Citral"}"#).unwrap();
        let patch = AllergenPatch::from(req);

        assert_eq!(patch.name.as_deref(), Some("Citral"));
        assert!(patch.cas_number.is_none());
        assert!(patch.max_concentration.is_none());
    }

    #[test]
    fn test_item_formats_ceiling() {
        let now = Utc::now();
        let item = AllergenItem::from(Allergen::new(
            1,
            "Citral".to_string(),
            None,
            None,
            "public".to_string(),
            now,
            now,
        ));

        assert_eq!(item.max_percent, "—");
    }
}

//! Domain entity representing a regulated allergen.

use chrono::{DateTime, Utc};

/// A regulated substance tracked for disclosure and compliance.
///
/// `max_concentration` is a fraction (0.02 = 2%) describing the regulatory
/// ceiling, when one is known.
#[derive(Debug, Clone, PartialEq)]
pub struct Allergen {
    pub id: i64,
    pub name: String,
    pub cas_number: Option<String>,
    pub max_concentration: Option<f64>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Allergen {
    /// Creates a new Allergen instance.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let allergen = Allergen::new(
    ///     1,
    ///     "Linalool".to_string(),
    ///     Some("78-70-6".to_string()),
    ///     Some(0.001),
    ///     "public".to_string(),
    ///     Utc::now(),
    ///     Utc::now(),
    /// );
    /// ```
    pub fn new(
        id: i64,
        name: String,
        cas_number: Option<String>,
        max_concentration: Option<f64>,
        owner_id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            cas_number,
            max_concentration,
            owner_id,
            created_at,
            updated_at,
        }
    }
}

/// Input data for creating an allergen.
#[derive(Debug, Clone, Default)]
pub struct NewAllergen {
    pub name: String,
    pub cas_number: Option<String>,
    pub max_concentration: Option<f64>,
}

/// Partial update of an allergen.
///
/// `None` leaves a field unchanged. For the optional columns, `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllergenPatch {
    pub name: Option<String>,
    pub cas_number: Option<Option<String>>,
    pub max_concentration: Option<Option<f64>>,
}

impl AllergenPatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.cas_number.is_none() && self.max_concentration.is_none()
    }
}

//! Allergen catalog service.

use crate::domain::entities::{Allergen, AllergenPatch, NewAllergen, OwnerId};
use crate::domain::repositories::AllergenRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::validation::{normalize_cas_number, normalize_name, validate_quantity};
use serde_json::json;
use std::sync::Arc;

/// Service for managing regulated allergens.
///
/// Validates CAS numbers and ceilings, and refuses to delete allergens that
/// ingredients still reference.
///
/// Cached ingredient profiles carry allergen names, so a rename drops the
/// cached profile of every ingredient containing the allergen.
pub struct AllergenService<R: AllergenRepository> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
}

impl<R: AllergenRepository> AllergenService<R> {
    /// Creates a new allergen service.
    pub fn new(repository: Arc<R>, cache: Arc<dyn CacheService>) -> Self {
        Self { repository, cache }
    }

    /// Creates a new allergen.
    ///
    /// # Validation
    ///
    /// - Name is trimmed and must not be blank
    /// - CAS number, when given, must look like `78-70-6`; blank means none
    /// - Maximum concentration must be finite and non-negative
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if validation fails.
    pub async fn create_allergen(
        &self,
        owner: &OwnerId,
        name: &str,
        cas_number: Option<&str>,
        max_concentration: Option<f64>,
    ) -> Result<Allergen, AppError> {
        let new_allergen = NewAllergen {
            name: normalize_name("name", name)?,
            cas_number: normalize_cas_number(cas_number)?,
            max_concentration: max_concentration
                .map(|v| validate_quantity("maxConcentration", v))
                .transpose()?,
        };

        self.repository.create(owner, new_allergen).await
    }

    /// Lists allergens by name.
    pub async fn list_allergens(&self, owner: &OwnerId) -> Result<Vec<Allergen>, AppError> {
        self.repository.list(owner).await
    }

    /// Retrieves an allergen by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the allergen does not exist.
    pub async fn get_allergen(&self, owner: &OwnerId, id: i64) -> Result<Allergen, AppError> {
        self.repository
            .find_by_id(owner, id)
            .await?
            .ok_or_else(|| AppError::not_found("Allergen not found", json!({ "id": id })))
    }

    /// Partially updates an allergen.
    ///
    /// An empty patch returns the stored allergen unchanged.
    pub async fn update_allergen(
        &self,
        owner: &OwnerId,
        id: i64,
        patch: AllergenPatch,
    ) -> Result<Allergen, AppError> {
        if patch.is_empty() {
            return self.get_allergen(owner, id).await;
        }

        let patch = AllergenPatch {
            name: patch
                .name
                .map(|n| normalize_name("name", &n))
                .transpose()?,
            cas_number: patch
                .cas_number
                .map(|cas| normalize_cas_number(cas.as_deref()))
                .transpose()?,
            max_concentration: patch
                .max_concentration
                .map(|max| {
                    max.map(|v| validate_quantity("maxConcentration", v))
                        .transpose()
                })
                .transpose()?,
        };

        let renamed = patch.name.is_some();
        let updated = self.repository.update(owner, id, patch).await?;

        if renamed {
            self.invalidate_linked_profiles(owner, id).await;
        }
        Ok(updated)
    }

    async fn invalidate_linked_profiles(&self, owner: &OwnerId, allergen_id: i64) {
        let ingredient_ids = match self.repository.linked_ingredient_ids(owner, allergen_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(allergen_id, error = %e, "Could not list ingredients to invalidate");
                return;
            }
        };

        for ingredient_id in ingredient_ids {
            if let Err(e) = self.cache.invalidate_profile(owner, ingredient_id).await {
                tracing::warn!(ingredient_id, error = %e, "Failed to invalidate profile cache");
            }
        }
    }

    /// Deletes an allergen that no ingredient links to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InUse`] if any ingredient still contains it.
    /// Returns [`AppError::NotFound`] if the allergen does not exist.
    pub async fn delete_allergen(&self, owner: &OwnerId, id: i64) -> Result<(), AppError> {
        let links = self.repository.count_links(owner, id).await?;
        if links > 0 {
            return Err(AppError::in_use(
                "Allergen is linked to ingredients",
                json!({ "id": id, "ingredients": links }),
            ));
        }

        if !self.repository.delete(owner, id).await? {
            return Err(AppError::not_found("Allergen not found", json!({ "id": id })));
        }
        Ok(())
    }
}

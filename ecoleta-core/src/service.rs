//! High-level service facade combining all providers.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::model::{
    Category, CategoryId, CollectionPoint, NewPoint, PointFilter, PointId, Region, RegionId,
};
use crate::ports::{CatalogPort, PointQueryPort, PointRegistrationPort, PortError, RegionPort};

/// Collection of ports the service talks to.
///
/// Exactly one implementation exists per seam at runtime (the georef
/// registry and the CRUD backend), so the ports travel as a flat bundle.
pub struct Providers {
    /// Geographic registry access.
    pub regions: Arc<dyn RegionPort>,
    /// Waste category catalog access.
    pub catalog: Arc<dyn CatalogPort>,
    /// Point lookup access.
    pub queries: Arc<dyn PointQueryPort>,
    /// Point registration access.
    pub registrations: Arc<dyn PointRegistrationPort>,
}

/// Public entry point for region lookups, point discovery, and registration.
pub struct EcoletaService {
    providers: Providers,
}

impl EcoletaService {
    /// Create a new service bound to the provided port bundle.
    #[must_use]
    pub fn new(providers: Providers) -> Self {
        Self { providers }
    }

    /// List all provinces known to the geographic registry.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::RegistryUnavailable`] when the registry call
    /// fails; callers degrade to an empty province list.
    pub async fn provinces(&self) -> Result<Vec<Region>, PortError> {
        self.providers.regions.provinces().await
    }

    /// List the cities of `province` in registry order.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::RegistryUnavailable`] when the registry call
    /// fails; callers keep the city list empty and let the user re-select.
    pub async fn cities(&self, province: RegionId) -> Result<Vec<Region>, PortError> {
        self.providers.regions.cities(province).await
    }

    /// Fetch the waste category catalog.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::CatalogUnavailable`] on backend failure.
    pub async fn categories(&self) -> Result<Vec<Category>, PortError> {
        self.providers.catalog.categories().await
    }

    /// Find the collection points matching the given selection.
    ///
    /// An incomplete region selection (either level unset) resolves to an
    /// empty list without touching the backend: a complete region is a
    /// precondition of the query, not an error. An empty category set means
    /// "any category"; a non-empty set matches points carrying at least one
    /// of the ids. Coordinates are rounded for marker stability before being
    /// handed back.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::QueryUnavailable`] on backend failure; callers
    /// keep the previously rendered point list.
    pub async fn find_points(
        &self,
        province: Option<RegionId>,
        city: Option<RegionId>,
        categories: &BTreeSet<CategoryId>,
    ) -> Result<Vec<CollectionPoint>, PortError> {
        let (Some(province), Some(city)) = (province, city) else {
            debug!("point query skipped, region selection incomplete");
            return Ok(Vec::new());
        };

        let filter = PointFilter {
            province,
            city,
            categories: categories.clone(),
        };

        debug!(
            city = city.0,
            province = province.0,
            categories = categories.len(),
            "querying points"
        );

        let points = self.providers.queries.query(&filter).await?;

        Ok(points
            .into_iter()
            .map(CollectionPoint::with_marker_precision)
            .collect())
    }

    /// Validate and persist a new collection point.
    ///
    /// `known_cities` is the last successfully fetched city list for the
    /// submission's province and `catalog` the last fetched category
    /// snapshot; both back the client-side checks the backend re-validates
    /// independently at persistence time. The write itself is a single
    /// atomic backend call covering the point and all its category links.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Validation`] naming the first offending field,
    /// or [`PortError::Transaction`] when the backend rejects the write; in
    /// both cases nothing is persisted.
    pub async fn register_point(
        &self,
        submission: &NewPoint,
        known_cities: &[Region],
        catalog: &[Category],
    ) -> Result<PointId, PortError> {
        validate_submission(submission, known_cities, catalog)?;

        debug!(
            city = submission.city.0,
            categories = submission.categories.len(),
            "registering point"
        );

        self.providers.registrations.register(submission).await
    }
}

/// Client-side submission checks, in submission-field order; the first
/// failing field wins.
fn validate_submission(
    submission: &NewPoint,
    known_cities: &[Region],
    catalog: &[Category],
) -> Result<(), PortError> {
    if submission.name.trim().is_empty() {
        return Err(PortError::invalid("name", "must not be empty"));
    }
    if submission.email.trim().is_empty() {
        return Err(PortError::invalid("email", "must not be empty"));
    }
    if submission.whatsapp.trim().is_empty() {
        return Err(PortError::invalid("whatsapp", "must not be empty"));
    }

    let city_known = known_cities
        .iter()
        .any(|city| city.id == submission.city && city.is_city_of(submission.province));
    if !city_known {
        return Err(PortError::invalid(
            "city_id",
            "not a known city of the selected province",
        ));
    }

    if submission.categories.is_empty() {
        return Err(PortError::invalid(
            "category_ids",
            "at least one category is required",
        ));
    }
    if let Some(unknown) = submission
        .categories
        .iter()
        .find(|id| !catalog.iter().any(|category| category.id == **id))
    {
        return Err(PortError::invalid(
            "category_ids",
            format!("unknown category {}", unknown.0),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;

    fn city(id: u64, province: u64) -> Region {
        Region {
            id: RegionId(id),
            name: format!("City {id}"),
            parent: Some(RegionId(province)),
            centroid: Coordinates { lat: 0.0, long: 0.0 },
        }
    }

    fn category(id: u64) -> Category {
        Category {
            id: CategoryId(id),
            title: format!("Category {id}"),
            image_ref: format!("uploads/{id}.svg"),
        }
    }

    fn submission() -> NewPoint {
        NewPoint {
            name: String::from("Recicla Centro"),
            email: String::from("contacto@recicla.example"),
            whatsapp: String::from("+54 11 5555-0001"),
            province: RegionId(2),
            city: RegionId(7),
            latitude: -34.6,
            longitude: -58.38,
            categories: BTreeSet::from([CategoryId(1), CategoryId(3)]),
            image: None,
        }
    }

    #[test]
    fn accepts_a_complete_submission() {
        let cities = [city(7, 2)];
        let catalog = [category(1), category(3)];
        assert!(validate_submission(&submission(), &cities, &catalog).is_ok());
    }

    #[test]
    fn rejects_blank_identity_fields_in_order() {
        let cities = [city(7, 2)];
        let catalog = [category(1), category(3)];

        let mut blank_all = submission();
        blank_all.name = String::from("  ");
        blank_all.email = String::new();
        let err = validate_submission(&blank_all, &cities, &catalog).unwrap_err();
        assert_eq!(err.validation_field(), Some("name"));

        let mut blank_whatsapp = submission();
        blank_whatsapp.whatsapp = String::new();
        let err = validate_submission(&blank_whatsapp, &cities, &catalog).unwrap_err();
        assert_eq!(err.validation_field(), Some("whatsapp"));
    }

    #[test]
    fn rejects_a_city_outside_the_province() {
        let cities = [city(7, 3)];
        let catalog = [category(1), category(3)];
        let err = validate_submission(&submission(), &cities, &catalog).unwrap_err();
        assert_eq!(err.validation_field(), Some("city_id"));
    }

    #[test]
    fn rejects_a_city_missing_from_the_fetched_list() {
        let catalog = [category(1), category(3)];
        let err = validate_submission(&submission(), &[], &catalog).unwrap_err();
        assert_eq!(err.validation_field(), Some("city_id"));
    }

    #[test]
    fn rejects_an_empty_category_set() {
        let cities = [city(7, 2)];
        let catalog = [category(1)];
        let mut empty = submission();
        empty.categories.clear();
        let err = validate_submission(&empty, &cities, &catalog).unwrap_err();
        assert_eq!(err.validation_field(), Some("category_ids"));
    }

    #[test]
    fn rejects_a_category_absent_from_the_catalog() {
        let cities = [city(7, 2)];
        let catalog = [category(1)];
        let err = validate_submission(&submission(), &cities, &catalog).unwrap_err();
        assert_eq!(err.validation_field(), Some("category_ids"));
    }
}

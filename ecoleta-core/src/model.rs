//! Domain data structures for regions, waste categories, and collection points.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Number of significant digits kept when rounding coordinates for markers.
const MARKER_PRECISION: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier of a region (province or city) in the geographic registry.
pub struct RegionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier of a waste category in the catalog.
pub struct CategoryId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier of a registered collection point.
pub struct PointId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Geographic coordinates as published by the registry.
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub long: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Administrative region from the external registry.
///
/// Regions form a two-level hierarchy: provinces carry no parent, cities
/// always reference the province they belong to. They are immutable
/// reference data, cached only for the lifetime of a selection session.
pub struct Region {
    /// Registry identifier.
    pub id: RegionId,
    /// Localized display name.
    pub name: String,
    /// Owning province for cities, `None` for provinces themselves.
    pub parent: Option<RegionId>,
    /// Centroid used to seed map viewports.
    pub centroid: Coordinates,
}

impl Region {
    /// Check whether this region is a second-level region of `province`.
    #[must_use]
    pub fn is_city_of(&self, province: RegionId) -> bool {
        self.parent == Some(province)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Waste category a collection point may accept.
pub struct Category {
    /// Catalog identifier.
    pub id: CategoryId,
    /// Human-friendly title, e.g. "Pilas y Baterias".
    pub title: String,
    /// Reference to the category icon served by the backend.
    pub image_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A registered collection point as returned by point queries.
pub struct CollectionPoint {
    /// Backend identifier.
    pub id: PointId,
    /// Name of the entity running the point.
    pub name: String,
    /// Contact e-mail address.
    pub email: String,
    /// Contact WhatsApp number.
    pub whatsapp: String,
    /// Reference to the uploaded point image.
    pub image_ref: String,
    /// City the point is located in.
    pub city: RegionId,
    /// Province the city belongs to.
    pub province: RegionId,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl CollectionPoint {
    /// Round both coordinates to four significant digits.
    ///
    /// Backend rows keep whatever precision was submitted; markers are
    /// rendered from the rounded value so they do not jitter between
    /// queries that return slightly different float noise.
    #[must_use]
    pub fn with_marker_precision(mut self) -> Self {
        self.latitude = to_precision(self.latitude, MARKER_PRECISION);
        self.longitude = to_precision(self.longitude, MARKER_PRECISION);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Image payload attached to a registration submission.
pub struct ImageUpload {
    /// File name forwarded to the backend upload handler.
    pub file_name: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
/// Submission describing a collection point to be registered.
pub struct NewPoint {
    /// Name of the entity running the point.
    pub name: String,
    /// Contact e-mail address.
    pub email: String,
    /// Contact WhatsApp number.
    pub whatsapp: String,
    /// Province the point is located in.
    pub province: RegionId,
    /// City within the province.
    pub city: RegionId,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Categories the point accepts; must not be empty.
    pub categories: BTreeSet<CategoryId>,
    /// Optional image shown on the point marker.
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Point query derived from a complete region selection.
pub struct PointFilter {
    /// Selected province.
    pub province: RegionId,
    /// Selected city within the province.
    pub city: RegionId,
    /// Category filter; empty means "any category".
    pub categories: BTreeSet<CategoryId>,
}

/// Round `value` to the given number of significant digits.
///
/// Zero and non-finite values are returned unchanged.
#[must_use]
pub fn to_precision(value: f64, digits: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let exponent = value.abs().log10().floor();
    let scale = 10f64.powf(f64::from(digits - 1) - exponent);
    (value * scale).round() / scale
}

//! Traits describing the external collaborators and the shared error taxonomy.

use async_trait::async_trait;

use crate::model::{Category, CollectionPoint, NewPoint, PointFilter, PointId, Region, RegionId};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the registry and backend collaborators.
pub enum PortError {
    /// Geographic registry could not be reached or returned an unreadable payload.
    #[error("Geographic registry unavailable: {0}")]
    RegistryUnavailable(String),
    /// Category catalog could not be reached or returned an unreadable payload.
    #[error("Category catalog unavailable: {0}")]
    CatalogUnavailable(String),
    /// Point query backend could not be reached or returned an unreadable payload.
    #[error("Point query unavailable: {0}")]
    QueryUnavailable(String),
    /// A submission field failed validation before anything was persisted.
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Submission field that failed validation.
        field: &'static str,
        /// What exactly was wrong with it.
        reason: String,
    },
    /// The registration transaction was rejected or rolled back; nothing was persisted.
    #[error("Registration not committed: {0}")]
    Transaction(String),
}

impl PortError {
    /// Shorthand for a [`PortError::Validation`] on the given field.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Field name carried by a [`PortError::Validation`], if any.
    #[must_use]
    pub fn validation_field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[async_trait]
/// Read access to the external geographic registry.
pub trait RegionPort: Send + Sync {
    /// List all first-level regions (provinces) in registry order.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::RegistryUnavailable`] when the registry cannot be
    /// reached or its payload cannot be decoded. Callers treat that as "no
    /// regions available", never as a fatal condition.
    async fn provinces(&self) -> Result<Vec<Region>, PortError>;

    /// List the second-level regions (cities) of `province` in registry order.
    ///
    /// A province unknown to the registry, or one without children, yields an
    /// empty list rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::RegistryUnavailable`] exactly like [`Self::provinces`].
    async fn cities(&self, province: RegionId) -> Result<Vec<Region>, PortError>;
}

#[async_trait]
/// Read access to the backend's fixed waste-category catalog.
pub trait CatalogPort: Send + Sync {
    /// List every known category in catalog order.
    ///
    /// The result doubles as the validation snapshot for registration
    /// submissions.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::CatalogUnavailable`] on backend failure.
    async fn categories(&self) -> Result<Vec<Category>, PortError>;
}

#[async_trait]
/// Point lookup against the backend.
pub trait PointQueryPort: Send + Sync {
    /// Fetch the collection points matching `filter`.
    ///
    /// An empty category set means "any category"; a non-empty set matches
    /// points carrying at least one of the ids (inclusive OR).
    ///
    /// # Errors
    ///
    /// Returns [`PortError::QueryUnavailable`] on backend failure. Callers
    /// keep the previously rendered point list in that case.
    async fn query(&self, filter: &PointFilter) -> Result<Vec<CollectionPoint>, PortError>;
}

#[async_trait]
/// Point registration against the backend.
pub trait PointRegistrationPort: Send + Sync {
    /// Persist `submission` atomically across the point and its category links.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Transaction`] when the backend rejects or rolls
    /// back the write; no partial point becomes visible to queries.
    async fn register(&self, submission: &NewPoint) -> Result<PointId, PortError>;
}

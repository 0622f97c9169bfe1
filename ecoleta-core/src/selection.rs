//! Session-scoped selection state and its staleness guard.
//!
//! The selection is a plain value mutated only by the interaction loop; every
//! transition bumps a monotonically increasing version token. Responses to
//! fetches triggered by a transition carry the token they were spawned with,
//! and are applied only while [`SelectionState::is_current`] still holds, so
//! the rendered city and point lists always reflect the *latest* selection
//! even when responses arrive out of order.

use std::collections::BTreeSet;

use crate::model::{CategoryId, PointFilter, RegionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Token identifying which selection a pending response belongs to.
pub struct SelectionVersion(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
/// The user's current region and category selection.
///
/// Created empty at session start and discarded with the session; nothing
/// here is ever persisted.
pub struct SelectionState {
    province: Option<RegionId>,
    city: Option<RegionId>,
    categories: BTreeSet<CategoryId>,
    version: SelectionVersion,
}

impl SelectionState {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            province: None,
            city: None,
            categories: BTreeSet::new(),
            version: SelectionVersion(0),
        }
    }

    /// Currently selected province, if any.
    #[must_use]
    pub fn province(&self) -> Option<RegionId> {
        self.province
    }

    /// Currently selected city, if any.
    #[must_use]
    pub fn city(&self) -> Option<RegionId> {
        self.city
    }

    /// Currently selected categories; empty means "any category".
    #[must_use]
    pub fn categories(&self) -> &BTreeSet<CategoryId> {
        &self.categories
    }

    /// Version token of the current selection.
    #[must_use]
    pub fn version(&self) -> SelectionVersion {
        self.version
    }

    /// Whether a response tagged with `version` still matches this selection.
    ///
    /// Stale responses must be discarded silently, whatever their arrival
    /// order: last write wins on selection order, not response order.
    #[must_use]
    pub fn is_current(&self, version: SelectionVersion) -> bool {
        self.version == version
    }

    /// Select a province.
    ///
    /// Resets the city to unset (its option list is about to be replaced by
    /// the dependent fetch) and leaves the category set untouched. Selecting
    /// the province that is already selected still counts as a transition —
    /// that is how a user retries a failed city fetch.
    pub fn select_province(&mut self, province: RegionId) -> SelectionVersion {
        self.province = Some(province);
        self.city = None;
        self.bump()
    }

    /// Select a city within the selected province.
    ///
    /// Returns `None` without any state change when no province is selected
    /// yet; the cascading UI cannot normally reach that call order.
    pub fn select_city(&mut self, city: RegionId) -> Option<SelectionVersion> {
        self.province?;
        self.city = Some(city);
        Some(self.bump())
    }

    /// Add `category` to the filter, or remove it if already present.
    pub fn toggle_category(&mut self, category: CategoryId) -> SelectionVersion {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
        self.bump()
    }

    /// The point query derived from this selection.
    ///
    /// `None` until both region levels are chosen: point queries require a
    /// complete region selection.
    #[must_use]
    pub fn filter(&self) -> Option<PointFilter> {
        let province = self.province?;
        let city = self.city?;
        Some(PointFilter {
            province,
            city,
            categories: self.categories.clone(),
        })
    }

    fn bump(&mut self) -> SelectionVersion {
        self.version = SelectionVersion(self.version.0 + 1);
        self.version
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

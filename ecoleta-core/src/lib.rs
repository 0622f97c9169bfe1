//! Core types and service wiring for the Ecoleta collection point directory.

/// Domain models and identifiers shared by all providers.
pub mod model;
/// Traits describing the provider interfaces and the error taxonomy.
pub mod ports;
/// Session-scoped selection state with staleness versioning.
pub mod selection;
/// High-level service facade used by clients.
pub mod service;

pub use model::*;
pub use ports::*;
pub use selection::*;
pub use service::*;

//! Core types, store port, and proximity search for the bintrack waste-bin tracker.

/// Great-circle distance and the radius search over a bin snapshot.
pub mod geo;
/// Domain models for bins and their fill status.
pub mod model;
/// Traits describing the bin store interface and its errors.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;

pub use geo::*;
pub use model::*;
pub use ports::*;
pub use service::*;

//! Trait describing the bin store and the errors it can raise.

use async_trait::async_trait;

use crate::model::{Bin, BinId, BinStatus, NewBin};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single field that failed validation, with a human-readable message.
pub struct FieldError {
    /// Name of the offending field, e.g. `"latitude"`.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
}

impl FieldError {
    /// Construct a field error.
    #[must_use]
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
/// Errors raised by a bin store.
pub enum StoreError {
    /// One or more fields violated the bin invariants.
    #[error("Validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),
    /// The referenced bin does not exist.
    #[error("Bin not found")]
    NotFound(BinId),
}

fn format_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|err| format!("{}: {}", err.field, err.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
/// Storage backend for bins. Implementations enforce the coordinate and
/// status invariants on every write, so readers never re-validate.
pub trait BinStore: Send + Sync {
    /// Validate and persist a new bin, assigning its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when a coordinate is out of range.
    async fn create(&self, new_bin: NewBin) -> Result<Bin, StoreError>;

    /// Fetch a bin by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no bin has that id.
    async fn get(&self, id: &BinId) -> Result<Bin, StoreError>;

    /// Change a bin's fill status, bumping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no bin has that id.
    async fn update_status(&self, id: &BinId, status: BinStatus) -> Result<Bin, StoreError>;

    /// Remove a bin, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no bin has that id.
    async fn delete(&self, id: &BinId) -> Result<Bin, StoreError>;

    /// A consistent point-in-time snapshot of every bin, in insertion order.
    ///
    /// # Errors
    ///
    /// Infallible for in-memory stores; the `Result` leaves room for
    /// backends that can fail to read.
    async fn list_all(&self) -> Result<Vec<Bin>, StoreError>;
}

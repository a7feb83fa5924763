//! In-memory [`BinStore`] implementation.
//!
//! Bins live in a mutex-guarded vector in insertion order, which is what
//! gives the nearby search its deterministic tie-break. Every write
//! validates first and only then mutates, so a failed write leaves the
//! store untouched. Not durable; backs the server and the test suites.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use bintrack_core::model::{Bin, BinId, BinStatus, NewBin};
use bintrack_core::ports::{BinStore, FieldError, StoreError};

/// Mutex-guarded in-memory bin collection.
#[derive(Default)]
pub struct MemoryBinStore {
    bins: Mutex<Vec<Bin>>,
}

impl MemoryBinStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bins currently stored.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex was poisoned by a panicking writer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.lock().expect("bin store mutex poisoned").len()
    }

    /// Whether the store holds no bins.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex was poisoned by a panicking writer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate(new_bin: &NewBin) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !(-90.0..=90.0).contains(&new_bin.latitude) {
        errors.push(FieldError::new(
            "latitude",
            "must be between -90 and 90 degrees",
        ));
    }
    if !(-180.0..=180.0).contains(&new_bin.longitude) {
        errors.push(FieldError::new(
            "longitude",
            "must be between -180 and 180 degrees",
        ));
    }
    errors
}

#[async_trait]
impl BinStore for MemoryBinStore {
    async fn create(&self, new_bin: NewBin) -> Result<Bin, StoreError> {
        let errors = validate(&new_bin);
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        let now = Utc::now();
        let bin = Bin {
            id: BinId(Uuid::new_v4().to_string()),
            latitude: new_bin.latitude,
            longitude: new_bin.longitude,
            status: new_bin.status.unwrap_or(BinStatus::Empty),
            added_at: now,
            updated_at: now,
        };

        let mut bins = self.bins.lock().expect("bin store mutex poisoned");
        bins.push(bin.clone());
        Ok(bin)
    }

    async fn get(&self, id: &BinId) -> Result<Bin, StoreError> {
        let bins = self.bins.lock().expect("bin store mutex poisoned");
        bins.iter()
            .find(|bin| bin.id == *id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update_status(&self, id: &BinId, status: BinStatus) -> Result<Bin, StoreError> {
        let mut bins = self.bins.lock().expect("bin store mutex poisoned");
        let bin = bins
            .iter_mut()
            .find(|bin| bin.id == *id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        bin.status = status;
        bin.updated_at = Utc::now();
        Ok(bin.clone())
    }

    async fn delete(&self, id: &BinId) -> Result<Bin, StoreError> {
        let mut bins = self.bins.lock().expect("bin store mutex poisoned");
        let index = bins
            .iter()
            .position(|bin| bin.id == *id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(bins.remove(index))
    }

    async fn list_all(&self) -> Result<Vec<Bin>, StoreError> {
        let bins = self.bins.lock().expect("bin store mutex poisoned");
        Ok(bins.clone())
    }
}

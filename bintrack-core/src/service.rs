//! High-level service facade over a bin store.

use std::sync::Arc;

use crate::geo::{self, InvalidQuery, NearbyQuery};
use crate::model::{Bin, BinId, BinStatus, NewBin};
use crate::ports::{BinStore, StoreError};

#[derive(thiserror::Error, Debug)]
/// Errors surfaced by [`BinService`] operations.
pub enum ServiceError {
    /// The store rejected or could not complete the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The nearby query parameters were out of range.
    #[error(transparent)]
    Query(#[from] InvalidQuery),
}

/// Public entry point for bin bookkeeping and the nearby search.
///
/// The service holds no bin state itself; every query reads one snapshot
/// from the store and hands it to the pure search function.
pub struct BinService {
    store: Arc<dyn BinStore>,
}

impl BinService {
    /// Create a service bound to the given store.
    #[must_use]
    pub fn new(store: Arc<dyn BinStore>) -> Self {
        Self { store }
    }

    /// Register a new bin.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError::Store`] validation error when a
    /// coordinate is out of range.
    pub async fn add_bin(&self, new_bin: NewBin) -> Result<Bin, ServiceError> {
        Ok(self.store.create(new_bin).await?)
    }

    /// Look up a single bin.
    ///
    /// # Errors
    ///
    /// Fails with not-found when the id is unknown.
    pub async fn bin(&self, id: &BinId) -> Result<Bin, ServiceError> {
        Ok(self.store.get(id).await?)
    }

    /// Change a bin's fill status.
    ///
    /// # Errors
    ///
    /// Fails with not-found when the id is unknown.
    pub async fn set_status(&self, id: &BinId, status: BinStatus) -> Result<Bin, ServiceError> {
        Ok(self.store.update_status(id, status).await?)
    }

    /// Remove a bin, returning the removed record.
    ///
    /// # Errors
    ///
    /// Fails with not-found when the id is unknown.
    pub async fn remove_bin(&self, id: &BinId) -> Result<Bin, ServiceError> {
        Ok(self.store.delete(id).await?)
    }

    /// Every registered bin, most recently added first.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub async fn bins(&self) -> Result<Vec<Bin>, ServiceError> {
        let mut bins = self.store.list_all().await?;
        bins.sort_by(|first, second| second.added_at.cmp(&first.added_at));
        Ok(bins)
    }

    /// All bins within `radius_km` of the given point, most recently
    /// added first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Query`] for out-of-range parameters before
    /// the store is consulted.
    pub async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<Bin>, ServiceError> {
        let query = NearbyQuery::new(latitude, longitude, radius_km)?;
        let snapshot = self.store.list_all().await?;
        Ok(geo::find_nearby(&snapshot, &query))
    }
}

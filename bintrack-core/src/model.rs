//! Domain data structures for waste bins and their fill status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Opaque identifier for a bin, assigned by the store at creation.
pub struct BinId(pub String);

impl fmt::Display for BinId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Fill status of a bin.
pub enum BinStatus {
    /// The bin is empty or close to it.
    #[default]
    Empty,
    /// The bin is roughly half full.
    #[serde(rename = "Half-Full")]
    HalfFull,
    /// The bin is full and should be collected.
    Full,
}

impl fmt::Display for BinStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BinStatus::Empty => "Empty",
            BinStatus::HalfFull => "Half-Full",
            BinStatus::Full => "Full",
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A registered waste bin: where it stands and how full it is.
///
/// Coordinate and status invariants are enforced by the store at write
/// time; a `Bin` handed out by the store always satisfies them.
pub struct Bin {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: BinId,
    /// Latitude in degrees, always within [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, always within [-180, 180].
    pub longitude: f64,
    /// Current fill status.
    pub status: BinStatus,
    /// When the bin was registered. Immutable.
    pub added_at: DateTime<Utc>,
    /// Set at creation, overwritten on every status change.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
/// Input for registering a new bin; id and timestamps are store-assigned.
pub struct NewBin {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Initial fill status; defaults to [`BinStatus::Empty`].
    #[serde(default)]
    pub status: Option<BinStatus>,
}

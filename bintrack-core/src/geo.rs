//! Great-circle distance and the radius search over a bin snapshot.
//!
//! The search is a pure function over one point-in-time snapshot: it never
//! mutates its input and holds no state of its own, so concurrent calls are
//! safe by construction. Distance of record is the haversine great-circle
//! distance; the flat-Earth bounding box is only a pre-filter and is skipped
//! wherever its degree-to-kilometer conversion stops being trustworthy.

use crate::model::Bin;

/// Mean Earth radius in kilometers, as used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius applied when a nearby query does not specify one.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Flat-Earth approximation: kilometers per degree of latitude.
const KM_PER_DEGREE: f64 = 111.0;

/// Above this absolute latitude the longitude degree-to-km conversion
/// degenerates (cos approaches 0) and the bounding box is skipped.
const POLAR_CUTOFF_DEG: f64 = 89.0;

/// The box is padded past the requested radius so the approximation can
/// never drop a candidate the exact haversine test would accept.
const BOX_PADDING: f64 = 1.1;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
/// A nearby query with out-of-range or non-numeric parameters.
pub enum InvalidQuery {
    /// Latitude outside [-90, 90] (or NaN).
    #[error("latitude must be between -90 and 90, got {0}")]
    Latitude(f64),
    /// Longitude outside [-180, 180] (or NaN).
    #[error("longitude must be between -180 and 180, got {0}")]
    Longitude(f64),
    /// Radius negative, NaN, or infinite.
    #[error("radius must be a non-negative finite number of kilometers, got {0}")]
    Radius(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// A validated "bins near me" query: center point plus search radius.
///
/// Constructing one is the validation step — a `NearbyQuery` that exists
/// always holds in-range coordinates and a usable radius.
pub struct NearbyQuery {
    latitude: f64,
    longitude: f64,
    radius_km: f64,
}

impl NearbyQuery {
    /// Validate and build a query. Out-of-range values are rejected, never
    /// clamped.
    ///
    /// A radius of zero is allowed and matches only co-located bins.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidQuery`] naming the offending parameter.
    pub fn new(latitude: f64, longitude: f64, radius_km: f64) -> Result<Self, InvalidQuery> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidQuery::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidQuery::Longitude(longitude));
        }
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(InvalidQuery::Radius(radius_km));
        }
        Ok(Self {
            latitude,
            longitude,
            radius_km,
        })
    }

    /// Query center latitude in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Query center longitude in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Search radius in kilometers.
    #[must_use]
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }
}

/// Great-circle distance in kilometers between two points given as
/// (latitude, longitude) degree pairs.
#[must_use]
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let hav = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let central_angle = 2.0 * hav.sqrt().atan2((1.0 - hav).sqrt());

    EARTH_RADIUS_KM * central_angle
}

/// All bins within the query radius, most recently added first.
///
/// Every accept/reject decision is made by the haversine distance; the
/// bounding box only thins the candidate list. The boundary is inclusive
/// (`distance <= radius`), ties in `added_at` keep snapshot order, and the
/// input snapshot is left untouched.
#[must_use]
pub fn find_nearby(bins: &[Bin], query: &NearbyQuery) -> Vec<Bin> {
    let bbox = BoundingBox::around(query);

    let mut hits: Vec<Bin> = bins
        .iter()
        .filter(|bin| {
            bbox.as_ref()
                .is_none_or(|bbox| bbox.contains(bin.latitude, bin.longitude))
        })
        .filter(|bin| {
            haversine_km(query.latitude, query.longitude, bin.latitude, bin.longitude)
                <= query.radius_km
        })
        .cloned()
        .collect();

    hits.sort_by(|first, second| second.added_at.cmp(&first.added_at));
    hits
}

#[derive(Debug, Clone, Copy)]
/// Flat-Earth degree window used to cheaply discard far-away candidates.
struct BoundingBox {
    lat_min: f64,
    lat_max: f64,
    lng_min: f64,
    lng_max: f64,
}

impl BoundingBox {
    /// Build the padded window around a query, or `None` when the
    /// approximation cannot be trusted: near the poles (cos of the
    /// latitude degenerates) or when the longitude window would cross the
    /// antimeridian.
    fn around(query: &NearbyQuery) -> Option<Self> {
        if query.latitude.abs() > POLAR_CUTOFF_DEG {
            return None;
        }

        let padded_km = query.radius_km * BOX_PADDING;
        let delta_lat = padded_km / KM_PER_DEGREE;

        // Kilometers per longitude degree shrink toward the poles, so take
        // the cos at the box edge closest to a pole to keep the window wide
        // enough for every latitude inside the box.
        let edge_lat = (query.latitude.abs() + delta_lat).min(POLAR_CUTOFF_DEG);
        let delta_lng = padded_km / (KM_PER_DEGREE * edge_lat.to_radians().cos());

        // Inclusive: a window touching the meridian exactly (radius 0 at
        // longitude +-180) must also fall back, since a bin stored with
        // the opposite sign sits at the same physical location.
        let lng_min = query.longitude - delta_lng;
        let lng_max = query.longitude + delta_lng;
        if lng_min <= -180.0 || lng_max >= 180.0 {
            return None;
        }

        Some(Self {
            lat_min: query.latitude - delta_lat,
            lat_max: query.latitude + delta_lat,
            lng_min,
            lng_max,
        })
    }

    fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.lat_min
            && latitude <= self.lat_max
            && longitude >= self.lng_min
            && longitude <= self.lng_max
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::model::{BinId, BinStatus};

    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn bin(id: &str, latitude: f64, longitude: f64, added_secs: i64) -> Bin {
        Bin {
            id: BinId(id.into()),
            latitude,
            longitude,
            status: BinStatus::Empty,
            added_at: ts(added_secs),
            updated_at: ts(added_secs),
        }
    }

    fn query(lat: f64, lng: f64, radius: f64) -> NearbyQuery {
        NearbyQuery::new(lat, lng, radius).unwrap()
    }

    fn ids(bins: &[Bin]) -> Vec<&str> {
        bins.iter().map(|bin| bin.id.0.as_str()).collect()
    }

    #[test]
    fn one_degree_along_the_equator_is_about_111_km() {
        let distance = haversine_km(0.0, 0.0, 0.0, 1.0);
        let reference = 111.19;
        assert!(
            ((distance - reference) / reference).abs() < 0.001,
            "expected ~{reference} km, got {distance}"
        );
    }

    #[test]
    fn distance_is_symmetric_and_zero_for_identical_points() {
        let there = haversine_km(40.7128, -74.006, 40.7589, -73.9851);
        let back = haversine_km(40.7589, -73.9851, 40.7128, -74.006);
        assert!((there - back).abs() < 1e-9, "asymmetric: {there} vs {back}");
        assert!(haversine_km(51.5, -0.12, 51.5, -0.12).abs() < 1e-12);
    }

    #[test]
    fn bin_at_exactly_the_radius_is_included() {
        let target = bin("edge", 0.0, 1.0, 0);
        let radius = haversine_km(0.0, 0.0, target.latitude, target.longitude);

        let included = find_nearby(std::slice::from_ref(&target), &query(0.0, 0.0, radius));
        assert_eq!(ids(&included), ["edge"]);

        let excluded = find_nearby(
            std::slice::from_ref(&target),
            &query(0.0, 0.0, radius - 0.001),
        );
        assert!(excluded.is_empty(), "bin past the radius must be dropped");
    }

    #[test]
    fn empty_snapshot_yields_empty_result() {
        assert!(find_nearby(&[], &query(12.0, 34.0, 5.0)).is_empty());
    }

    #[test]
    fn results_are_ordered_most_recent_first() {
        let bins = vec![
            bin("oldest", 0.0, 0.0, 10),
            bin("newest", 0.001, 0.0, 30),
            bin("middle", 0.0, 0.001, 20),
        ];
        let found = find_nearby(&bins, &query(0.0, 0.0, 5.0));
        assert_eq!(ids(&found), ["newest", "middle", "oldest"]);
    }

    #[test]
    fn equal_timestamps_keep_snapshot_order() {
        let bins = vec![
            bin("first", 0.0, 0.0, 0),
            bin("second", 0.001, 0.0, 0),
            bin("third", 0.0, 0.001, 0),
        ];
        let found = find_nearby(&bins, &query(0.0, 0.0, 5.0));
        assert_eq!(ids(&found), ["first", "second", "third"]);
    }

    #[test]
    fn repeated_calls_return_identical_results() {
        let bins = vec![
            bin("a", 40.7128, -74.006, 1),
            bin("b", 40.7589, -73.9851, 2),
            bin("c", 41.0, -74.5, 3),
        ];
        let nearby = query(40.7128, -74.006, 10.0);
        let first = find_nearby(&bins, &nearby);
        let second = find_nearby(&bins, &nearby);
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_parameters_are_rejected_not_clamped() {
        assert_eq!(
            NearbyQuery::new(95.0, 0.0, 5.0),
            Err(InvalidQuery::Latitude(95.0))
        );
        assert_eq!(
            NearbyQuery::new(0.0, 181.0, 5.0),
            Err(InvalidQuery::Longitude(181.0))
        );
        assert_eq!(
            NearbyQuery::new(0.0, 0.0, -1.0),
            Err(InvalidQuery::Radius(-1.0))
        );
        assert!(NearbyQuery::new(f64::NAN, 0.0, 5.0).is_err());
        assert!(NearbyQuery::new(0.0, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn zero_radius_matches_only_co_located_bins() {
        let bins = vec![bin("here", 48.1, 11.5, 0), bin("near", 48.1001, 11.5, 1)];
        let found = find_nearby(&bins, &query(48.1, 11.5, 0.0));
        assert_eq!(ids(&found), ["here"]);
    }

    #[test]
    fn duplicate_coordinates_are_all_returned() {
        let bins = vec![
            bin("twin-a", 48.1, 11.5, 0),
            bin("twin-b", 48.1, 11.5, 1),
            bin("far", 49.5, 11.5, 2),
        ];
        let found = find_nearby(&bins, &query(48.1, 11.5, 1.0));
        assert_eq!(ids(&found), ["twin-b", "twin-a"]);
    }

    #[test]
    fn near_the_pole_bins_across_all_longitudes_are_found() {
        // At 89.9 degrees north the flat-Earth longitude window is useless;
        // the search must fall back to pure haversine. All four bins sit
        // well inside 100 km of the query point despite raw longitude
        // differences of up to 180 degrees.
        let bins = vec![
            bin("lng0", 89.6, 0.0, 0),
            bin("lng90", 89.6, 90.0, 1),
            bin("lng180", 89.6, 180.0, 2),
            bin("lng-90", 89.6, -90.0, 3),
        ];
        for candidate in &bins {
            let distance = haversine_km(89.9, 0.0, candidate.latitude, candidate.longitude);
            assert!(
                distance < 100.0,
                "test premise: {} is {distance} km away",
                candidate.id
            );
        }

        let found = find_nearby(&bins, &query(89.9, 0.0, 100.0));
        assert_eq!(found.len(), 4, "every polar bin must be included");
    }

    #[test]
    fn antimeridian_neighbors_are_found_from_either_side() {
        // 0.1 degrees of longitude apart across the 180 meridian, ~11 km.
        let bins = vec![bin("west", 0.0, -179.95, 0)];
        let found = find_nearby(&bins, &query(0.0, 179.95, 50.0));
        assert_eq!(ids(&found), ["west"]);
    }

    #[test]
    fn meridian_180_bins_match_regardless_of_longitude_sign() {
        // +180 and -180 are the same meridian; a bin stored with either
        // sign must be reachable from a query using the other. The zero
        // radius window touches the meridian exactly, so the haversine
        // fallback has to decide, not the degree window.
        let bins = vec![bin("east-signed", 10.0, 180.0, 0), bin("west-signed", 10.0, -180.0, 1)];

        let found = find_nearby(&bins, &query(10.0, 180.0, 0.001));
        assert_eq!(ids(&found), ["west-signed", "east-signed"]);

        let found = find_nearby(&bins, &query(10.0, -180.0, 0.001));
        assert_eq!(found.len(), 2, "sign of 180 must not matter");

        let pinned = find_nearby(&bins, &query(10.0, 180.0, 0.0));
        assert!(
            pinned.iter().any(|hit| hit.id.0 == "east-signed"),
            "identical coordinates match at radius 0"
        );
    }

    #[test]
    fn input_snapshot_is_not_mutated() {
        let bins = vec![bin("b", 50.0, 8.0, 5), bin("a", 0.0, 0.0, 0)];
        let before = bins.clone();
        let _found = find_nearby(&bins, &query(0.0, 0.0, 5.0));
        assert_eq!(bins, before);
    }

    #[test]
    fn two_bin_city_scenario() {
        // Downtown Manhattan and Times Square, ~5.4 km apart.
        let bins = vec![
            bin("downtown", 40.7128, -74.006, 0),
            bin("midtown", 40.7589, -73.9851, 1),
        ];

        let tight = find_nearby(&bins, &query(40.7128, -74.006, 1.0));
        assert_eq!(ids(&tight), ["downtown"]);

        let wide = find_nearby(&bins, &query(40.7128, -74.006, 10.0));
        assert_eq!(ids(&wide), ["midtown", "downtown"]);
    }

    #[test]
    fn bounding_box_prefilter_agrees_with_haversine() {
        // A ring of bins straddling the radius at a mid latitude; the
        // padded box must never drop one the exact distance would keep.
        let center = (52.52, 13.405);
        let radius = 25.0;
        let mut bins = Vec::new();
        for step in 0..24 {
            let angle = f64::from(step) * 15.0_f64.to_radians();
            let lat = center.0 + 0.24 * angle.cos();
            let lng = center.1 + 0.38 * angle.sin();
            bins.push(bin(&format!("ring{step}"), lat, lng, i64::from(step)));
        }

        let found = find_nearby(&bins, &query(center.0, center.1, radius));
        let expected: Vec<&str> = bins
            .iter()
            .rev()
            .filter(|bin| haversine_km(center.0, center.1, bin.latitude, bin.longitude) <= radius)
            .map(|bin| bin.id.0.as_str())
            .collect();
        assert_eq!(ids(&found), expected);
    }
}

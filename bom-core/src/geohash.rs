//! Location keys for the BOM API.
//!
//! Locations are addressed by geohash: the longitude and latitude intervals
//! are halved alternately (longitude first) and every five bits select one
//! character of the base-32 alphabet below.

use serde::{Deserialize, Serialize};

use crate::error::CoordinateError;

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Precision used for observations, forecasts and warnings.
pub const REGIONAL_PRECISION: usize = 6;

/// Precision used for the location-name lookup.
pub const PRECISE_PRECISION: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Validated constructor. Values outside the valid ranges are rejected,
    /// never clamped.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Ok(Self { latitude, longitude })
        } else {
            Err(CoordinateError { latitude, longitude })
        }
    }

    pub fn geohash(&self, precision: usize) -> String {
        encode(self.latitude, self.longitude, precision)
    }
}

/// Encode a coordinate as a geohash of exactly `precision` characters.
///
/// Callers must pass latitude in `[-90, 90]`, longitude in `[-180, 180]` and
/// `precision >= 1`; use [`Coordinate::new`] to check untrusted input.
pub fn encode(latitude: f64, longitude: f64, precision: usize) -> String {
    debug_assert!((-90.0..=90.0).contains(&latitude), "latitude out of range");
    debug_assert!((-180.0..=180.0).contains(&longitude), "longitude out of range");
    debug_assert!(precision >= 1, "precision must be at least 1");

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut geohash = String::with_capacity(precision);
    let mut even = true;
    let mut bit = 0;
    let mut ch = 0_usize;

    while geohash.len() < precision {
        let (value, range) = if even {
            (longitude, &mut lon_range)
        } else {
            (latitude, &mut lat_range)
        };

        let mid = (range.0 + range.1) / 2.0;
        if value > mid {
            ch |= 1 << (4 - bit);
            range.0 = mid;
        } else {
            range.1 = mid;
        }
        even = !even;

        if bit < 4 {
            bit += 1;
        } else {
            geohash.push(BASE32[ch] as char);
            bit = 0;
            ch = 0;
        }
    }

    geohash
}

/// The pair of keys a refresh cycle needs for one coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationKeys {
    /// Precision-7 key, for the location-name lookup.
    pub precise: String,
    /// Precision-6 key, for observations, forecasts and warnings.
    pub regional: String,
}

impl LocationKeys {
    pub fn for_coordinate(coordinate: Coordinate) -> Self {
        let precise = coordinate.geohash(PRECISE_PRECISION);
        let regional = precise[..REGIONAL_PRECISION].to_string();
        Self { precise, regional }
    }
}

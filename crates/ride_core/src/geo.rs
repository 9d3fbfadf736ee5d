//! Geographic primitives: validated coordinates and haversine distances.
//!
//! Distances use the haversine formula with an Earth radius of 6371 km and
//! are cached in a global LRU keyed by the coordinate bit patterns, so
//! repeated lookups for the same pair (e.g. the three per-class fare
//! estimates for one route) compute the trigonometry once.

use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock};

use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside `-90..=90` latitude or
    /// `-180..=180` longitude (or non-finite values).
    pub fn new(lat: f64, lng: f64) -> Result<Self, BookingError> {
        let candidate = Self { lat, lng };
        if candidate.is_valid() {
            Ok(candidate)
        } else {
            Err(BookingError::InvalidCoordinate { lat, lng })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Uncached haversine distance in kilometers.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

type CoordBits = (u64, u64);

fn coord_bits(c: Coordinate) -> CoordBits {
    (c.lat.to_bits(), c.lng.to_bits())
}

/// Global distance cache (50,000 entries).
fn get_distance_cache() -> &'static Mutex<LruCache<(CoordBits, CoordBits), f64>> {
    static CACHE: OnceLock<Mutex<LruCache<(CoordBits, CoordBits), f64>>> = OnceLock::new();
    CACHE.get_or_init(|| {
        Mutex::new(LruCache::new(
            NonZeroUsize::new(50_000).expect("cache size must be non-zero"),
        ))
    })
}

/// Haversine distance with LRU caching.
///
/// Uses a symmetric key (smaller bit pattern first) to maximize cache hits;
/// distance is symmetric so the orientation of the pair does not matter.
pub fn distance_km_cached(a: Coordinate, b: Coordinate) -> f64 {
    let (ka, kb) = (coord_bits(a), coord_bits(b));
    let key = if ka <= kb { (ka, kb) } else { (kb, ka) };

    let mut cache = match get_distance_cache().lock() {
        Ok(guard) => guard,
        // Fallback: compute without cache if mutex poisoned
        Err(_) => return distance_km(a, b),
    };

    *cache.get_or_insert(key, || distance_km(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(Coordinate::new(28.6139, 77.2090).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate { lat: 28.6139, lng: 77.2090 };
        let b = Coordinate { lat: 28.5355, lng: 77.3910 };
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = Coordinate { lat: 52.52, lng: 13.405 };
        assert_eq!(distance_km(a, a), 0.0);
    }

    #[test]
    fn delhi_to_noida_distance() {
        let pickup = Coordinate { lat: 28.6139, lng: 77.2090 };
        let dropoff = Coordinate { lat: 28.5355, lng: 77.3910 };
        let d = distance_km(pickup, dropoff);
        assert!((d - 19.796).abs() < 0.05, "unexpected distance: {d}");
    }

    #[test]
    fn known_long_distance_within_half_percent() {
        // Berlin -> Paris, great-circle reference ~877.46 km.
        let berlin = Coordinate { lat: 52.5200, lng: 13.4050 };
        let paris = Coordinate { lat: 48.8566, lng: 2.3522 };
        let d = distance_km(berlin, paris);
        assert!((d - 877.46).abs() / 877.46 < 0.005, "unexpected distance: {d}");
    }

    #[test]
    fn cached_distance_matches_uncached() {
        let a = Coordinate { lat: 28.7041, lng: 77.1025 };
        let b = Coordinate { lat: 28.6139, lng: 77.2090 };
        assert_eq!(distance_km_cached(a, b), distance_km(a, b));
        // Reversed orientation hits the same symmetric key.
        assert_eq!(distance_km_cached(b, a), distance_km(a, b));
    }
}

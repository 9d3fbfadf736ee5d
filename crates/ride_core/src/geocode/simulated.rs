//! Deterministic in-process geocoder backed by a small Delhi-NCR gazetteer.
//!
//! Forward search is a ranked substring match over place names. Reverse
//! lookup goes through an H3 cell index (resolution 6, ~3.2 km edge cells):
//! candidate places are collected from the grid disk around the query point
//! and the nearest by haversine wins. A point with no gazetteer place nearby
//! resolves to [`GeocoderError::NoResult`], which exercises the caller's
//! coordinate-string fallback.

use std::collections::HashMap;

use h3o::{CellIndex, LatLng, Resolution};

use super::{Geocoder, LocationSuggestion, MAX_SUGGESTIONS};
use crate::error::GeocoderError;
use crate::geo::{self, Coordinate};

/// Cell resolution for the reverse-lookup index.
const INDEX_RESOLUTION: Resolution = Resolution::Six;
/// Widest grid ring searched before reverse lookup gives up.
const MAX_REVERSE_RING: u32 = 2;

struct Place {
    name: &'static str,
    lat: f64,
    lng: f64,
}

const PLACES: &[Place] = &[
    Place { name: "Connaught Place, New Delhi", lat: 28.6315, lng: 77.2167 },
    Place { name: "Noida Sector 18", lat: 28.5700, lng: 77.3260 },
    Place { name: "Noida City Centre", lat: 28.5747, lng: 77.3560 },
    Place { name: "Rohini Sector 10", lat: 28.7041, lng: 77.1025 },
    Place { name: "India Gate, New Delhi", lat: 28.6129, lng: 77.2295 },
    Place { name: "Indira Gandhi International Airport", lat: 28.5562, lng: 77.1000 },
    Place { name: "Hauz Khas Village", lat: 28.5535, lng: 77.1940 },
    Place { name: "Select Citywalk, Saket", lat: 28.5286, lng: 77.2190 },
    Place { name: "Karol Bagh", lat: 28.6519, lng: 77.1905 },
    Place { name: "Chandni Chowk", lat: 28.6562, lng: 77.2301 },
    Place { name: "Lajpat Nagar Central Market", lat: 28.5708, lng: 77.2434 },
    Place { name: "Dwarka Sector 21", lat: 28.5521, lng: 77.0585 },
    Place { name: "Cyber City, Gurugram", lat: 28.4950, lng: 77.0890 },
    Place { name: "Vasant Kunj", lat: 28.5200, lng: 77.1550 },
    Place { name: "Nehru Place", lat: 28.5483, lng: 77.2513 },
    Place { name: "Janakpuri District Centre", lat: 28.6290, lng: 77.0810 },
    Place { name: "Akshardham Temple", lat: 28.6127, lng: 77.2773 },
    Place { name: "Greater Kailash M Block Market", lat: 28.5480, lng: 77.2380 },
    Place { name: "Paharganj, New Delhi", lat: 28.6453, lng: 77.2128 },
    Place { name: "Lodhi Garden", lat: 28.5931, lng: 77.2197 },
    Place { name: "Mayur Vihar Phase 1", lat: 28.6040, lng: 77.2940 },
];

pub struct SimulatedGeocoder {
    /// H3 cell -> gazetteer indices, for reverse lookups.
    index: HashMap<CellIndex, Vec<usize>>,
}

impl SimulatedGeocoder {
    pub fn new() -> Self {
        let mut index: HashMap<CellIndex, Vec<usize>> = HashMap::new();
        for (i, place) in PLACES.iter().enumerate() {
            let Ok(point) = LatLng::new(place.lat, place.lng) else {
                continue;
            };
            index
                .entry(point.to_cell(INDEX_RESOLUTION))
                .or_default()
                .push(i);
        }
        Self { index }
    }

    fn suggestion(index: usize) -> LocationSuggestion {
        let place = &PLACES[index];
        LocationSuggestion {
            display_name: place.name.to_string(),
            location: Coordinate { lat: place.lat, lng: place.lng },
            place_id: format!("sim-{index}"),
        }
    }
}

impl Default for SimulatedGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder for SimulatedGeocoder {
    fn search(&self, query: &str) -> Result<Vec<LocationSuggestion>, GeocoderError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        // Rank by earliest match position, then gazetteer order.
        let mut hits: Vec<(usize, usize)> = PLACES
            .iter()
            .enumerate()
            .filter_map(|(i, place)| {
                place.name.to_lowercase().find(&needle).map(|pos| (pos, i))
            })
            .collect();
        hits.sort();

        Ok(hits
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, i)| Self::suggestion(i))
            .collect())
    }

    fn reverse(&self, lat: f64, lng: f64) -> Result<String, GeocoderError> {
        let origin = LatLng::new(lat, lng)
            .map_err(|err| GeocoderError::Payload(err.to_string()))?
            .to_cell(INDEX_RESOLUTION);
        let target = Coordinate { lat, lng };

        let best = origin
            .grid_disk::<Vec<_>>(MAX_REVERSE_RING)
            .into_iter()
            .filter_map(|cell| self.index.get(&cell))
            .flatten()
            .copied()
            .min_by(|&a, &b| {
                let da = geo::distance_km(target, Self::suggestion(a).location);
                let db = geo::distance_km(target, Self::suggestion(b).location);
                da.total_cmp(&db)
            });

        best.map(|i| PLACES[i].name.to_string())
            .ok_or(GeocoderError::NoResult)
    }
}

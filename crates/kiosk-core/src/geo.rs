//! Geographic primitives.
//!
//! Distances here are planar: the squared-difference approximation in
//! coordinate degrees, not a geodesic. Callers compare them against
//! thresholds expressed in the same unit.

use serde::{Deserialize, Serialize};

/// Movement (in coordinate degrees) beyond which nearby results go stale.
/// Roughly 500 m at the kiosk's latitude.
pub const DEFAULT_PREFETCH_THRESHOLD: f64 = 0.005;

/// Kilometres per coordinate degree, used for rough walking estimates.
pub const KM_PER_DEGREE: f64 = 111.0;

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Planar Euclidean distance to `other` in coordinate degrees.
    pub fn planar_distance(&self, other: &Position) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        (dlat * dlat + dlng * dlng).sqrt()
    }

    /// Returns true when `other` lies strictly farther than `threshold`.
    ///
    /// Movement of exactly `threshold` does not count.
    pub fn moved_beyond(&self, other: &Position, threshold: f64) -> bool {
        self.planar_distance(other) > threshold
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

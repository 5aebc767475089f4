//! Routing targets handed to the map collaborator.

use serde::Serialize;

use crate::geo::{KM_PER_DEGREE, Position};
use crate::place::{Category, Place};

/// Walking pace used for arrival estimates, in minutes per kilometre.
const WALKING_MINUTES_PER_KM: f64 = 15.0;
const MIN_WALKING_MINUTES: u32 = 2;

/// A selected place enriched for the directions overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencyInfo {
    pub place: Place,
    pub title: String,
    pub icon: &'static str,
    pub description: String,
    pub helpline: Option<&'static str>,
}

impl EmergencyInfo {
    pub fn from_place(place: Place) -> Self {
        let category: Category = place.category;
        Self {
            title: place.name.clone(),
            icon: category.icon(),
            description: format!("GPS tracking active to {}.", place.name),
            helpline: category.helpline(),
            place,
        }
    }

    pub fn coords(&self) -> Position {
        self.place.coords
    }
}

/// Everything the map collaborator needs to draw a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionsRequest {
    pub from: Position,
    pub to: EmergencyInfo,
}

impl DirectionsRequest {
    pub fn new(from: Position, to: EmergencyInfo) -> Self {
        Self { from, to }
    }

    /// Both endpoints, for fitting the map viewport.
    pub fn bounds(&self) -> (Position, Position) {
        (self.from, self.to.coords())
    }

    /// Rough walking time along the straight line between endpoints.
    pub fn walking_minutes(&self) -> u32 {
        let km = self.from.planar_distance(&self.to.coords()) * KM_PER_DEGREE;
        let minutes = (km * WALKING_MINUTES_PER_KM).round() as u32;
        minutes.max(MIN_WALKING_MINUTES)
    }

    /// Deep link that opens walking directions in Google Maps.
    pub fn external_maps_url(&self) -> String {
        let to = self.to.coords();
        format!(
            "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}&travelmode=walking",
            self.from.lat, self.from.lng, to.lat, to.lng
        )
    }
}

/// Renders markers and a route overlay for a directions request.
pub trait MapCollaborator: Send + Sync {
    fn show_route(&self, request: &DirectionsRequest);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hospital() -> Place {
        Place {
            id: "medical-0".to_string(),
            name: "City Hospital".to_string(),
            address: "12 MG Road".to_string(),
            coords: Position::new(28.61, 77.20),
            category: Category::Medical,
            rating: Some(4.5),
        }
    }

    #[test]
    fn test_emergency_info_from_place() {
        let info = EmergencyInfo::from_place(hospital());
        assert_eq!(info.title, "City Hospital");
        assert_eq!(info.icon, "🏥");
        assert_eq!(info.description, "GPS tracking active to City Hospital.");
        assert_eq!(info.helpline, Some("108"));
    }

    #[test]
    fn test_walking_minutes_has_floor() {
        let info = EmergencyInfo::from_place(hospital());
        let request = DirectionsRequest::new(Position::new(28.61, 77.20), info);
        assert_eq!(request.walking_minutes(), 2);
    }

    #[test]
    fn test_walking_minutes_scales_with_distance() {
        let info = EmergencyInfo::from_place(hospital());
        // 0.01 deg ≈ 1.11 km ≈ 17 minutes
        let request = DirectionsRequest::new(Position::new(28.62, 77.20), info);
        assert_eq!(request.walking_minutes(), 17);
    }

    #[test]
    fn test_external_maps_url() {
        let info = EmergencyInfo::from_place(hospital());
        let request = DirectionsRequest::new(Position::new(28.6415, 77.2197), info);
        assert_eq!(
            request.external_maps_url(),
            "https://www.google.com/maps/dir/?api=1&origin=28.6415,77.2197&destination=28.61,77.2&travelmode=walking"
        );
    }
}

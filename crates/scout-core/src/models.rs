//! Core data models for survey route planning.

use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
///
/// Altitude is absent until the operator confirms one during waypoint
/// placement; it is never inferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
    /// Assigned flight altitude in meters AMSL.
    #[serde(default, alias = "alt")]
    pub alt_m: Option<f64>,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            alt_m: None,
        }
    }

    pub fn with_altitude(lat: f64, lon: f64, alt_m: f64) -> Self {
        Self {
            lat,
            lon,
            alt_m: Some(alt_m),
        }
    }
}

/// A numbered stop on a survey route.
///
/// Ids are positional: at all times the set of ids on a route is exactly
/// `0..len` and a waypoint's index equals its id. Every structural change
/// (add, remove, reorder) renumbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: usize,
    #[serde(flatten)]
    pub coord: Coordinate,
}

impl Waypoint {
    pub fn new(id: usize, coord: Coordinate) -> Self {
        Self { id, coord }
    }
}

/// The active survey route.
///
/// `id` is the server-assigned persistence identifier, absent until the
/// route has been saved at least once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Check the dense-id invariant. Used by tests and debug assertions.
    pub fn ids_are_dense(&self) -> bool {
        self.waypoints.iter().enumerate().all(|(i, wp)| wp.id == i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waypoint_accepts_legacy_field_names() {
        let wp: Waypoint =
            serde_json::from_str(r#"{"id": 0, "lat": 39.7, "lng": -75.5, "alt": 42.5}"#)
                .expect("legacy waypoint should parse");
        assert_eq!(wp.id, 0);
        assert!((wp.coord.lon - (-75.5)).abs() < 1e-9);
        assert_eq!(wp.coord.alt_m, Some(42.5));
    }

    #[test]
    fn route_roundtrips_without_persisted_id() {
        let route = Route {
            id: None,
            name: "field-7".to_string(),
            waypoints: vec![Waypoint::new(0, Coordinate::new(39.72, -75.57))],
        };
        let json = serde_json::to_string(&route).expect("serialize");
        let back: Route = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.id, None);
        assert_eq!(back.name, "field-7");
        assert!(back.ids_are_dense());
    }
}

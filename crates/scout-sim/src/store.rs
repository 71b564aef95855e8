//! In-memory store for the active survey route.

use scout_core::models::{Coordinate, Route, Waypoint};
use scout_core::optimizer;

/// Owns the single active route plus its optional persisted identity.
///
/// Mutations renumber waypoint ids densely and re-run the tour optimizer
/// whenever more than two waypoints remain. All operations are synchronous;
/// the optimizer runs to completion before control returns.
#[derive(Debug, Default)]
pub struct RouteStore {
    route: Route,
}

impl RouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.route.waypoints
    }

    /// Server-assigned id, present once the route has been saved.
    pub fn persisted_id(&self) -> Option<&str> {
        self.route.id.as_deref()
    }

    /// Record the identity assigned by a successful save.
    pub fn mark_persisted(&mut self, id: String, name: String) {
        self.route.id = Some(id);
        self.route.name = name;
    }

    /// Append a waypoint and return its id. Editing detaches the route from
    /// any previously loaded persisted identity.
    pub fn add_waypoint(&mut self, coord: Coordinate) -> usize {
        self.route.id = None;
        let id = self.route.waypoints.len();
        self.route.waypoints.push(Waypoint::new(id, coord));
        self.reoptimize();
        debug_assert!(self.route.ids_are_dense());
        id
    }

    /// Remove a waypoint by id. Returns false when the id is unknown.
    pub fn remove_waypoint(&mut self, id: usize) -> bool {
        let before = self.route.waypoints.len();
        self.route.waypoints.retain(|wp| wp.id != id);
        if self.route.waypoints.len() == before {
            return false;
        }

        for (idx, wp) in self.route.waypoints.iter_mut().enumerate() {
            wp.id = idx;
        }
        self.reoptimize();
        debug_assert!(self.route.ids_are_dense());
        true
    }

    /// Drop all route state.
    pub fn clear(&mut self) {
        self.route = Route::default();
    }

    /// Replace the route from a persisted snapshot, then re-derive the tour
    /// order.
    pub fn load(&mut self, mut route: Route) {
        for (idx, wp) in route.waypoints.iter_mut().enumerate() {
            wp.id = idx;
        }
        self.route = route;
        self.reoptimize();
        debug_assert!(self.route.ids_are_dense());
    }

    /// The closed polyline for the map widget: every waypoint in tour order,
    /// with the first coordinate repeated at the end.
    pub fn polyline(&self) -> Vec<Coordinate> {
        let mut coords: Vec<Coordinate> = self
            .route
            .waypoints
            .iter()
            .map(|wp| wp.coord.clone())
            .collect();
        if let Some(first) = coords.first().cloned() {
            coords.push(first);
        }
        coords
    }

    fn reoptimize(&mut self) {
        if self.route.waypoints.len() > 2 {
            optimizer::optimize(&mut self.route.waypoints);
        }
    }
}

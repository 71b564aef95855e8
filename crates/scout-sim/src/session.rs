//! Planning session context.
//!
//! One session owns the route store and the mission simulator for the
//! lifetime of a planning interaction, so route mutations and mission
//! lifecycle can never race: anything that would invalidate the tour under
//! a running mission cancels the mission first.

use crate::mission::{MissionError, MissionHandle, MissionSimulator, SimConfig};
use crate::store::RouteStore;
use scout_core::models::{Coordinate, Route};
use std::sync::Arc;

pub struct Session {
    store: RouteStore,
    sim: Arc<MissionSimulator>,
}

impl Session {
    pub fn new(cfg: SimConfig) -> Self {
        Self {
            store: RouteStore::new(),
            sim: Arc::new(MissionSimulator::new(cfg)),
        }
    }

    pub fn store(&self) -> &RouteStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RouteStore {
        &mut self.store
    }

    pub fn simulator(&self) -> &Arc<MissionSimulator> {
        &self.sim
    }

    pub fn add_waypoint(&mut self, coord: Coordinate) -> usize {
        self.store.add_waypoint(coord)
    }

    pub fn remove_waypoint(&mut self, id: usize) -> bool {
        self.store.remove_waypoint(id)
    }

    /// Drop the route. A running mission is cancelled first.
    pub fn clear(&mut self) {
        self.sim.cancel();
        self.store.clear();
    }

    /// Replace the route from a persisted snapshot. A running mission is
    /// cancelled first.
    pub fn load(&mut self, route: Route) {
        self.sim.cancel();
        self.store.load(route);
    }

    /// Start simulating the current tour. Mission registration with the
    /// persistence API must already have succeeded; an empty route is
    /// rejected before any state transition.
    pub fn start_mission(&self) -> Result<MissionHandle, MissionError> {
        self.sim.start(self.store.waypoints().to_vec())
    }
}

//! Mission simulation and route state.
//!
//! The simulator advances a virtual survey drone along a closed waypoint
//! tour on tokio timers; the store owns the active route; the session ties
//! the two together with a clear lifecycle.

pub mod mission;
pub mod session;
pub mod store;

pub use mission::{
    MissionError, MissionHandle, MissionOutcome, MissionSimulator, MissionState, MissionStatus,
    SimConfig, TelemetryFrame,
};
pub use session::Session;
pub use store::RouteStore;

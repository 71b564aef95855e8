pub mod error;
pub mod geo;
pub mod models;
pub mod optimizer;
pub mod terrain;

pub use error::TerrainError;
pub use geo::haversine_distance;
pub use models::{Coordinate, Route, Waypoint};
pub use optimizer::{optimize, tour_length};
pub use terrain::{recommend_altitude, sample_transect, AltitudeBands, AltitudeSlider, TerrainProfile};

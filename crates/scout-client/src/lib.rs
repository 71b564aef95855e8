//! HTTP clients for the planner's external collaborators.
//!
//! Three independent services: the elevation provider (terrain samples),
//! the route persistence API (CRUD plus mission registration), and auth
//! (credentials for an opaque bearer token). No client retries on its own;
//! recovery is always user-initiated re-invocation.

pub mod auth;
pub mod elevation;
pub mod error;
pub mod routes;

pub use auth::AuthClient;
pub use elevation::ElevationClient;
pub use error::ClientError;
pub use routes::RoutesClient;

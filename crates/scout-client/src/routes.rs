//! Route persistence API client.
//!
//! CRUD over saved routes plus mission registration. Every request carries
//! the bearer credential; a missing or rejected credential is surfaced to
//! the caller, never retried. Save and load failures leave the caller's
//! in-memory route untouched by construction (the client returns the
//! server's copy only on success).

use crate::error::ClientError;
use reqwest::Client;
use scout_core::models::Route;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RoutesClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RoutesClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            auth_token: None,
        }
    }

    /// Update the bearer token at runtime (login, rotation).
    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.auth_token = token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    fn auth_header(&self) -> Result<String, ClientError> {
        let token = self.auth_token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(format!("Bearer {}", token))
    }

    /// List all saved routes.
    pub async fn list_routes(&self) -> Result<Vec<Route>, ClientError> {
        let url = format!("{}/api/routes", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header()?)
            .send()
            .await?;
        check_status(&response)?;
        Ok(response.json().await?)
    }

    /// Fetch a single saved route by id.
    pub async fn get_route(&self, id: &str) -> Result<Route, ClientError> {
        let url = format!("{}/api/routes/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header()?)
            .send()
            .await?;
        check_status(&response)?;
        Ok(response.json().await?)
    }

    /// Save a route. POST when the route has never been persisted (the
    /// server assigns the id), PUT to overwrite an existing one. Returns
    /// the server's copy, including the assigned id.
    pub async fn save_route(&self, route: &Route) -> Result<Route, ClientError> {
        let builder = match route.id.as_deref() {
            Some(id) => self
                .client
                .put(format!("{}/api/routes/{}", self.base_url, id)),
            None => self.client.post(format!("{}/api/routes", self.base_url)),
        };

        let response = builder
            .header("Authorization", self.auth_header()?)
            .json(route)
            .send()
            .await?;
        check_status(&response)?;
        Ok(response.json().await?)
    }

    /// Register the start of a mission for a saved route. The simulation
    /// must not begin unless this succeeds.
    pub async fn start_mission(&self, route_id: &str) -> Result<(), ClientError> {
        let url = format!("{}/api/routes/{}/start", self.base_url, route_id);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header()?)
            .send()
            .await?;
        check_status(&response)?;
        Ok(())
    }
}

fn check_status(response: &reqwest::Response) -> Result<(), ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        tracing::warn!(status = %status, url = %response.url(), "Persistence API request failed");
        Err(ClientError::Status(status.as_u16()))
    }
}

//! Elevation provider client.
//!
//! Open-elevation style lookup: POST a list of locations, get elevations
//! back in the same order. The terrain sampler depends on that ordering to
//! pair elevations with transect coordinates.

use crate::error::ClientError;
use reqwest::Client;
use scout_core::models::Coordinate;
use scout_core::terrain::TerrainProfile;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct LookupRequest {
    locations: Vec<Location>,
}

#[derive(Debug, Serialize)]
struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    elevation: f64,
}

pub struct ElevationClient {
    client: Client,
    provider_url: String,
}

impl ElevationClient {
    pub fn new(provider_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            provider_url: provider_url.into(),
        }
    }

    /// Fetch elevations for a transect of coordinates.
    ///
    /// Every failure mode is [`ClientError::DataUnavailable`]: an
    /// unreachable provider, a non-2xx reply, a malformed payload, or a
    /// sample count that does not match the request. The caller must
    /// abandon the pending waypoint placement either way.
    pub async fn fetch_profile(
        &self,
        transect: impl IntoIterator<Item = Coordinate>,
    ) -> Result<TerrainProfile, ClientError> {
        let coords: Vec<Coordinate> = transect.into_iter().collect();
        let request = LookupRequest {
            locations: coords
                .iter()
                .map(|c| Location {
                    latitude: c.lat,
                    longitude: c.lon,
                })
                .collect(),
        };

        let response = match self
            .client
            .post(&self.provider_url)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "Elevation provider unreachable");
                return Err(ClientError::DataUnavailable);
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Elevation provider rejected lookup");
            return Err(ClientError::DataUnavailable);
        }

        let payload: LookupResponse = match response.json().await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "Elevation provider returned a malformed payload");
                return Err(ClientError::DataUnavailable);
            }
        };
        if payload.results.is_empty() || payload.results.len() != coords.len() {
            tracing::warn!(
                requested = coords.len(),
                received = payload.results.len(),
                "Elevation provider returned unusable sample count"
            );
            return Err(ClientError::DataUnavailable);
        }

        Ok(TerrainProfile {
            samples: coords
                .into_iter()
                .zip(payload.results)
                .map(|(coord, result)| (coord, result.elevation))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_request_wire_shape() {
        let request = LookupRequest {
            locations: vec![Location {
                latitude: 39.72,
                longitude: -75.57,
            }],
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["locations"][0]["latitude"], 39.72);
        assert_eq!(json["locations"][0]["longitude"], -75.57);
    }

    #[test]
    fn lookup_response_wire_shape() {
        let payload: LookupResponse = serde_json::from_str(
            r#"{"results": [{"elevation": 12.0, "latitude": 39.72, "longitude": -75.57}]}"#,
        )
        .expect("provider payload should parse");
        assert_eq!(payload.results.len(), 1);
        assert_eq!(payload.results[0].elevation, 12.0);
    }

    #[tokio::test]
    async fn unreachable_provider_reads_as_data_unavailable() {
        // Port 9 (discard) is never serving HTTP locally.
        let client = ElevationClient::new("http://127.0.0.1:9/api/v1/lookup");
        let result = client
            .fetch_profile([Coordinate::new(39.72, -75.57)])
            .await;
        assert!(matches!(result, Err(ClientError::DataUnavailable)));
    }
}

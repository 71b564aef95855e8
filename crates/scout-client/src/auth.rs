//! Auth client: credentials in, opaque bearer token out.

use crate::error::ClientError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct PasswordChangeRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Exchange credentials for a bearer token. The token is opaque to the
    /// rest of the system; it is only ever attached to request headers.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let url = format!("{}/api/auth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Login rejected");
            return Err(ClientError::Status(status.as_u16()));
        }

        let payload: LoginResponse = response.json().await?;
        Ok(payload.access_token)
    }

    /// Change the password for the logged-in account.
    pub async fn change_password(
        &self,
        token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        let url = format!("{}/api/auth/change-password", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&PasswordChangeRequest {
                current_password,
                new_password,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Password change rejected");
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_wire_shape() {
        let json = serde_json::to_value(LoginRequest {
            username: "admin",
            password: "hunter2",
        })
        .expect("serialize");
        assert_eq!(json["username"], "admin");
        assert_eq!(json["password"], "hunter2");
    }

    #[test]
    fn login_response_parses_token() {
        let payload: LoginResponse =
            serde_json::from_str(r#"{"access_token": "tok-abc", "token_type": "bearer"}"#)
                .expect("login payload should parse");
        assert_eq!(payload.access_token, "tok-abc");
    }
}

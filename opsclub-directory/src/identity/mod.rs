//! Identity provider client
//!
//! Token verification is delegated to the hosted identity provider: the
//! service forwards the caller's access token and gets back the account it
//! belongs to. No signature checking happens locally.

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// A user account as reported by the identity provider
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedUser {
    /// Subject id (stable, opaque)
    pub id: String,
    /// Account email, when the provider exposes one
    pub email: Option<String>,
}

impl VerifiedUser {
    /// The stable identity string like records are keyed on.
    /// Prefers the account email, falls back to the subject id.
    pub fn identity(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

/// Client for the external identity provider
#[derive(Debug, Clone)]
pub struct IdentityClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl IdentityClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Verify an access token and return the account it belongs to
    pub async fn get_user(&self, token: &str) -> Result<VerifiedUser> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let mut request = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token));
        if let Some(api_key) = &self.api_key {
            request = request.header("apikey", api_key);
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Unauthorized(
                "Token rejected by identity provider".to_string(),
            ));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::IdentityApi(format!(
                "Failed to verify token: {} - {}",
                status, body
            )));
        }

        let user: VerifiedUser = response
            .json()
            .await
            .map_err(|e| Error::IdentityApi(format!("Malformed user response: {}", e)))?;

        debug!("Resolved session for user: {}", user.id);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_prefers_email() {
        let user = VerifiedUser {
            id: "user-123".to_string(),
            email: Some("ops@example.com".to_string()),
        };
        assert_eq!(user.identity(), "ops@example.com");
    }

    #[test]
    fn test_identity_falls_back_to_subject_id() {
        let user = VerifiedUser {
            id: "user-123".to_string(),
            email: None,
        };
        assert_eq!(user.identity(), "user-123");
    }

    #[test]
    fn test_user_response_ignores_extra_fields() {
        let user: VerifiedUser = serde_json::from_str(
            r#"{"id":"user-123","email":"ops@example.com","role":"authenticated","aud":"api"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "user-123");
        assert_eq!(user.email.as_deref(), Some("ops@example.com"));
    }
}

//! Authentication verification client.
//!
//! StudyBot does not run the OAuth login flow itself; a separate
//! authentication service owns it. This client only asks that service whether
//! a Telegram user has completed login (`GET /verify/{user_id}`) and builds
//! the login link to hand out when they have not.
//!
//! Failure policy is **fail-open**: if the auth service is unreachable,
//! times out, or answers with a non-200 status, the user is treated as
//! authenticated and a warning is logged. An auth outage must not lock every
//! student out of the bot.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{auth_service_url, AUTH_TIMEOUT};

/// Response body of `GET /verify/{user_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    /// Whether the user has completed the login flow.
    #[serde(default)]
    pub authenticated: bool,

    /// Profile data captured at login, when authenticated.
    #[serde(default)]
    pub user_info: Option<serde_json::Value>,
}

/// Client for the authentication service.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    /// When true, verification always succeeds (development mode).
    disabled: bool,
}

impl AuthClient {
    /// Create a client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            disabled: false,
        }
    }

    /// Create a client against the configured service URL.
    pub fn from_env() -> Self {
        Self::new(auth_service_url())
    }

    /// Create a client that skips verification entirely (development mode).
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: String::new(),
            disabled: true,
        }
    }

    /// The login link to send to an unauthenticated user.
    pub fn login_url(&self, user_id: &str) -> String {
        format!("{}/login/{}", self.base_url, user_id)
    }

    /// Check whether a user is authenticated.
    ///
    /// Never fails: service errors degrade to `true` (fail-open) with a
    /// warning log.
    pub async fn verify(&self, user_id: &str) -> bool {
        if self.disabled {
            debug!("Auth checks disabled, treating user as authenticated");
            return true;
        }

        let url = format!("{}/verify/{}", self.base_url, user_id);

        let response = match self
            .client
            .get(&url)
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Auth service unreachable, failing open");
                return true;
            }
        };

        if !response.status().is_success() {
            warn!(
                user_id = %user_id,
                status = %response.status(),
                "Auth service returned error status, failing open"
            );
            return true;
        }

        match response.json::<VerifyResponse>().await {
            Ok(body) => {
                debug!(user_id = %user_id, authenticated = body.authenticated, "Auth check complete");
                body.authenticated
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Malformed auth response, failing open");
                true
            }
        }
    }
}

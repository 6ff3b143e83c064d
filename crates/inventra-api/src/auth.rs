// Authentication endpoints
//
// Token-based login/refresh/verify/logout. The login and refresh payloads
// carry a fresh bearer token; storing it in the shared TokenCell is the
// session manager's job, not this module's -- these methods only move bytes.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{SessionData, UserRecord, VerifyData};

impl ApiClient {
    /// Authenticate with email and password.
    ///
    /// `POST /api/auth/login`
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SessionData, Error> {
        debug!(email, "logging in");
        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });
        self.post("auth/login", &body).await
    }

    /// Exchange the current token for a fresh one.
    ///
    /// `POST /api/auth/refresh` -- authenticated with the token being
    /// replaced.
    pub async fn refresh(&self) -> Result<SessionData, Error> {
        debug!("refreshing session token");
        self.post("auth/refresh", &json!({})).await
    }

    /// Verify that the current token is still accepted.
    ///
    /// `GET /api/auth/verify` -- returns the user the token belongs to.
    pub async fn verify(&self) -> Result<UserRecord, Error> {
        debug!("verifying session token");
        let data: VerifyData = self.get("auth/verify").await?;
        Ok(data.user)
    }

    /// End the current session server-side.
    ///
    /// `POST /api/auth/logout`. Best-effort: the caller clears local state
    /// regardless of whether this call succeeds.
    pub async fn logout(&self) -> Result<(), Error> {
        debug!("logging out");
        self.request_unit(reqwest::Method::POST, "auth/logout", None)
            .await
    }
}

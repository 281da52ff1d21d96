//! Auth endpoints and OAuth entry points.

use serde_json::json;

use super::ApiClient;
use crate::errors::Result;
use crate::models::{AuthUserResponse, Identity};

/// Identity providers the backend can redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Facebook,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Facebook => "facebook",
        }
    }
}

impl ApiClient {
    /// GET /api/auth/user - Current identity, `None` when not authenticated.
    pub async fn current_user(&self) -> Result<Option<Identity>> {
        let body: AuthUserResponse = self.json(self.get("/api/auth/user")).await?;
        if let Some(reason) = &body.error {
            tracing::debug!("Auth check returned no session: {}", reason);
        }
        Ok(body.user)
    }

    /// POST /logout - End the server side session.
    pub async fn logout(&self) -> Result<()> {
        self.unit(self.post("/logout").json(&json!({}))).await
    }

    /// URL the browser is sent to in order to start the provider's OAuth flow.
    pub fn login_url(&self, provider: OAuthProvider) -> String {
        self.url(&format!("/oauth2/authorization/{}", provider.as_str()))
    }
}

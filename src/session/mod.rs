//! Session store.
//!
//! Holds the authenticated identity for the lifetime of the process. Other
//! components receive it through the [`SessionAccessor`] trait instead of
//! reaching for a global.

use std::sync::RwLock;

use crate::api::{ApiClient, OAuthProvider};
use crate::errors::{ClientError, Result};
use crate::models::Identity;

/// Read access to the current identity.
pub trait SessionAccessor: Send + Sync {
    fn identity(&self) -> Option<Identity>;

    /// The identity, or [`ClientError::AuthRequired`] when nobody is logged in.
    fn require_identity(&self) -> Result<Identity> {
        self.identity().ok_or(ClientError::AuthRequired)
    }
}

/// Views the client can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Feed,
    Profile,
    Communities,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Feed => "/",
            Route::Profile => "/profile",
            Route::Communities => "/communities",
        }
    }
}

/// Result of [`SessionStore::logout`].
///
/// The navigation happens whatever the server said. `server_result` tells the
/// caller whether the server-side session was actually ended.
#[derive(Debug)]
pub struct LogoutOutcome {
    pub navigate_to: Route,
    pub server_result: Result<()>,
}

#[derive(Debug, Default)]
struct SessionState {
    identity: Option<Identity>,
    loading: bool,
}

pub struct SessionStore {
    api: ApiClient,
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: RwLock::new(SessionState {
                identity: None,
                loading: true,
            }),
        }
    }

    /// Ask the backend who is logged in. Never fails: any error clears the
    /// identity. Loading is complete afterwards in every case.
    pub async fn check_session(&self) -> Option<Identity> {
        let identity = match self.api.current_user().await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::debug!("Session check failed: {}", e);
                None
            }
        };

        match &identity {
            Some(user) => tracing::info!("Authenticated as {} ({})", user.display_name(), user.id),
            None => tracing::info!("No active session"),
        }

        self.set_state(identity.clone(), false);
        identity
    }

    /// End the session and go to the login view.
    pub async fn logout(&self) -> LogoutOutcome {
        let server_result = self.api.logout().await;
        if let Err(e) = &server_result {
            tracing::warn!("Logout request failed, navigating to login anyway: {}", e);
        }
        self.set_state(None, false);
        LogoutOutcome {
            navigate_to: Route::Login,
            server_result,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().map(|s| s.loading).unwrap_or(false)
    }

    pub fn login_url(&self, provider: OAuthProvider) -> String {
        self.api.login_url(provider)
    }

    fn set_state(&self, identity: Option<Identity>, loading: bool) {
        if let Ok(mut state) = self.state.write() {
            state.identity = identity;
            state.loading = loading;
        }
    }
}

impl SessionAccessor for SessionStore {
    fn identity(&self) -> Option<Identity> {
        self.state.read().ok().and_then(|s| s.identity.clone())
    }
}

/// Fixed identity, for callers that already know who is logged in.
#[derive(Debug, Clone, Default)]
pub struct StaticSession(pub Option<Identity>);

impl SessionAccessor for StaticSession {
    fn identity(&self) -> Option<Identity> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_identity() {
        let anonymous = StaticSession(None);
        assert!(matches!(
            anonymous.require_identity(),
            Err(ClientError::AuthRequired)
        ));

        let session = StaticSession(Some(Identity {
            id: "u1".to_string(),
            name: None,
            email: None,
            profile_picture: None,
        }));
        assert_eq!(session.require_identity().unwrap().display_name(), "u1");
    }

    #[test]
    fn test_new_store_is_loading() {
        let config = crate::config::Config::for_origin("http://localhost:8081").unwrap();
        let store = SessionStore::new(ApiClient::new(&config).unwrap());
        assert!(store.is_loading());
        assert!(store.identity().is_none());
        assert_eq!(
            store.login_url(OAuthProvider::Facebook),
            "http://localhost:8081/oauth2/authorization/facebook"
        );
    }
}

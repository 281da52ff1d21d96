//! REST transport module.
//!
//! [`ApiClient`] issues credentialed requests against the backend origin. One
//! file per backend resource adds its endpoints as inherent methods.

mod auth;
mod communities;
mod learning_plans;
mod notifications;
mod posts;
mod profile;
mod upload;
mod users;

pub use auth::*;
pub use upload::*;

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::errors::{ClientError, Result};

/// Credentialed HTTP client bound to a single backend origin.
///
/// Cloning is cheap; clones share the connection pool and the cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    origin: Url,
    ws_url: Url,
    jar: Arc<Jar>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &config.session_cookie {
            jar.add_cookie_str(cookie, &config.api_origin);
        }

        let http = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_origin.as_str().trim_end_matches('/').to_string(),
            origin: config.api_origin.clone(),
            ws_url: config.ws_url.clone(),
            jar,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn ws_url(&self) -> &Url {
        &self.ws_url
    }

    /// Cookies the jar would send to the origin, for the broker handshake.
    pub fn cookie_header(&self) -> Option<HeaderValue> {
        self.jar.cookies(&self.origin)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        tracing::debug!("GET {}", path);
        self.http.get(self.url(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        tracing::debug!("POST {}", path);
        self.http.post(self.url(path))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        tracing::debug!("PUT {}", path);
        self.http.put(self.url(path))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        tracing::debug!("DELETE {}", path);
        self.http.delete(self.url(path))
    }

    /// Send a request and turn non-success statuses into [`ClientError::Api`].
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_response(status, &body);
        tracing::debug!("Request failed: {}", err);
        Err(err)
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn unit(&self, request: RequestBuilder) -> Result<()> {
        self.execute(request).await?;
        Ok(())
    }
}

//! Configuration module for the SkillShare client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::errors::{ClientError, Result};

const DEFAULT_API_ORIGIN: &str = "http://localhost:8081";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin every REST call is made against
    pub api_origin: Url,
    /// Message broker WebSocket endpoint
    pub ws_url: Url,
    /// Session cookie (`NAME=value`) seeded into the cookie jar
    pub session_cookie: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_origin = env::var("SKILLSHARE_API_ORIGIN")
            .unwrap_or_else(|_| DEFAULT_API_ORIGIN.to_string());
        let api_origin = parse_url("SKILLSHARE_API_ORIGIN", &api_origin)?;

        let ws_url = match env::var("SKILLSHARE_WS_URL") {
            Ok(raw) => parse_url("SKILLSHARE_WS_URL", &raw)?,
            Err(_) => derive_ws_url(&api_origin)?,
        };

        let session_cookie = env::var("SKILLSHARE_SESSION_COOKIE")
            .ok()
            .filter(|c| !c.trim().is_empty());

        let request_timeout = match env::var("SKILLSHARE_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                ClientError::Config(format!("Invalid SKILLSHARE_REQUEST_TIMEOUT_SECS: {}", raw))
            })?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let log_level = env::var("SKILLSHARE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_origin,
            ws_url,
            session_cookie,
            request_timeout,
            log_level,
        })
    }

    /// Configuration pointing at `origin` with every other value defaulted.
    pub fn for_origin(origin: &str) -> Result<Self> {
        let api_origin = parse_url("origin", origin)?;
        let ws_url = derive_ws_url(&api_origin)?;
        Ok(Self {
            api_origin,
            ws_url,
            session_cookie: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: "info".to_string(),
        })
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| ClientError::Config(format!("Invalid {} '{}': {}", name, raw, e)))
}

/// `http(s)://host/` becomes `ws(s)://host/ws/websocket`, the raw WebSocket
/// transport of the broker's SockJS endpoint.
fn derive_ws_url(origin: &Url) -> Result<Url> {
    let scheme = match origin.scheme() {
        "https" => "wss",
        _ => "ws",
    };
    let mut ws = origin.clone();
    ws.set_scheme(scheme)
        .map_err(|_| ClientError::Config(format!("Cannot derive broker URL from {}", origin)))?;
    ws.set_path("/ws/websocket");
    Ok(ws)
}

//! SkillShare client
//!
//! Client-side synchronization for the SkillShare backend: session, REST
//! transport, STOMP real-time channel, entity reconciliation and the
//! controllers that drive user actions.

pub mod api;
pub mod app;
pub mod chat;
pub mod config;
pub mod controller;
pub mod errors;
pub mod models;
pub mod overlay;
pub mod realtime;
pub mod reconcile;
pub mod session;

pub use app::App;
pub use config::Config;
pub use errors::{ClientError, Result};

//! Data models for the SkillShare client.
//!
//! These models mirror the backend's JSON documents field for field so that a
//! server response can replace a local entry wholesale.

mod community;
mod learning_plan;
mod notification;
mod post;
mod user;

pub use community::*;
pub use learning_plan::*;
pub use notification::*;
pub use post::*;
pub use user::*;

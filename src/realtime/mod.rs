//! Real-time channel to the backend's message broker.
//!
//! The broker speaks STOMP over WebSocket. Notifications arrive on a per-user
//! queue; community chat uses one topic per community for delivery and one
//! application destination per community for sends.

mod broker;
mod frame;

pub use broker::*;
pub use frame::*;

/// Per-user notification queue.
pub fn notification_queue(user_id: &str) -> String {
    format!("/user/{}/queue/notifications", user_id)
}

/// Topic every member of a community receives chat messages on.
pub fn community_topic(community_id: &str) -> String {
    format!("/topic/community/{}", community_id)
}

/// Destination chat sends are published to.
pub fn community_send_destination(community_id: &str) -> String {
    format!("/app/community/{}/sendMessage", community_id)
}

//! Notification model.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::reconcile::Entity;

/// Kind of event a notification reports.
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    PostLike,
    CommentLike,
    NewComment,
    NewFollower,
    #[serde(other)]
    Other,
}

/// A notification addressed to the current identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<NotificationType>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub related_entity_id: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Entity for Notification {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Body of the unread-count endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_is_tolerated() {
        let n: Notification = serde_json::from_str(
            r#"{"id":"n1","senderId":"u2","type":"SOMETHING_NEW","content":"x","read":false}"#,
        )
        .unwrap();
        assert_eq!(n.kind, Some(NotificationType::Other));
    }

    #[test]
    fn test_known_type() {
        let n: Notification =
            serde_json::from_str(r#"{"id":"n1","type":"NEW_FOLLOWER","content":"x"}"#).unwrap();
        assert_eq!(n.kind, Some(NotificationType::NewFollower));
        assert!(!n.read);
    }
}

//! Community and chat message models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::reconcile::Entity;

/// A community with a member list and a chat channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default, alias = "private")]
    pub is_private: bool,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub last_message_preview: Option<String>,
    #[serde(default)]
    pub last_message_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Community {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    /// Copy of this community with `user_id` added to or removed from its members.
    pub fn with_membership(&self, user_id: &str, joined: bool) -> Self {
        let mut updated = self.clone();
        updated.members.retain(|m| m != user_id);
        if joined {
            updated.members.push(user_id.to_string());
        }
        updated
    }
}

impl Entity for Community {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Request body for `POST /api/communities`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityRequest {
    pub name: String,
    pub description: String,
    pub is_private: bool,
    pub tags: Vec<String>,
}

impl CreateCommunityRequest {
    /// Add a tag unless it is blank or already present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }
}

/// A message in a community chat. Append-only, ordered by timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub community_id: String,
    #[serde(default)]
    pub sender_id: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

impl Entity for ChatMessage {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Body of a chat send, over HTTP or published to the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub community_id: String,
    pub content: String,
}

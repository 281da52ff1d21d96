//! Community and community chat endpoints.

use serde_json::json;

use super::ApiClient;
use crate::errors::Result;
use crate::models::{
    ChatMessage, Community, CreateCommunityRequest, SendMessageRequest, UnreadCount,
};

impl ApiClient {
    /// GET /api/communities - Public communities.
    pub async fn list_communities(&self) -> Result<Vec<Community>> {
        self.json(self.get("/api/communities")).await
    }

    /// GET /api/communities/user/{userId} - Communities the user belongs to.
    pub async fn list_user_communities(&self, user_id: &str) -> Result<Vec<Community>> {
        self.json(self.get(&format!("/api/communities/user/{}", user_id))).await
    }

    /// POST /api/communities
    pub async fn create_community(&self, request: &CreateCommunityRequest) -> Result<Community> {
        self.json(self.post("/api/communities").json(request)).await
    }

    /// POST /api/communities/{id}/join
    pub async fn join_community(&self, community_id: &str) -> Result<()> {
        self.unit(
            self.post(&format!("/api/communities/{}/join", community_id))
                .json(&json!({})),
        )
        .await
    }

    /// POST /api/communities/{id}/leave
    pub async fn leave_community(&self, community_id: &str) -> Result<()> {
        self.unit(
            self.post(&format!("/api/communities/{}/leave", community_id))
                .json(&json!({})),
        )
        .await
    }

    /// GET /api/communities/{id}/messages - Full chat history, oldest first.
    pub async fn list_messages(&self, community_id: &str) -> Result<Vec<ChatMessage>> {
        self.json(self.get(&format!("/api/communities/{}/messages", community_id))).await
    }

    /// POST /api/communities/{id}/messages
    pub async fn send_message(&self, community_id: &str, content: &str) -> Result<()> {
        let request = SendMessageRequest {
            community_id: community_id.to_string(),
            content: content.to_string(),
        };
        self.unit(
            self.post(&format!("/api/communities/{}/messages", community_id))
                .json(&request),
        )
        .await
    }

    /// POST /api/communities/{id}/mark-as-read
    pub async fn mark_community_read(&self, community_id: &str) -> Result<()> {
        self.unit(
            self.post(&format!("/api/communities/{}/mark-as-read", community_id))
                .json(&json!({})),
        )
        .await
    }

    /// GET /api/communities/{id}/unread-count
    pub async fn community_unread_count(&self, community_id: &str) -> Result<u64> {
        let body: UnreadCount = self
            .json(self.get(&format!("/api/communities/{}/unread-count", community_id)))
            .await?;
        Ok(body.count)
    }
}

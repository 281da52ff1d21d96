//! User lookup and follow endpoints.

use serde_json::json;

use super::ApiClient;
use crate::errors::Result;
use crate::models::{Profile, UserLookup};

impl ApiClient {
    /// GET /api/users/{id} - Display info for avatar resolution.
    pub async fn get_user(&self, user_id: &str) -> Result<UserLookup> {
        self.json(self.get(&format!("/api/users/{}", user_id))).await
    }

    /// POST /api/users/{id}/follow - Returns the followed user's profile.
    pub async fn follow_user(&self, user_id: &str) -> Result<Profile> {
        self.json(
            self.post(&format!("/api/users/{}/follow", user_id))
                .json(&json!({})),
        )
        .await
    }

    /// POST /api/users/{id}/unfollow - Returns the unfollowed user's profile.
    pub async fn unfollow_user(&self, user_id: &str) -> Result<Profile> {
        self.json(
            self.post(&format!("/api/users/{}/unfollow", user_id))
                .json(&json!({})),
        )
        .await
    }
}

//! Profile endpoints.

use super::ApiClient;
use crate::errors::Result;
use crate::models::{Profile, ProfilePictureRequest, UpdateProfileRequest};

impl ApiClient {
    /// GET /api/profile - The caller's own profile.
    pub async fn get_profile(&self) -> Result<Profile> {
        self.json(self.get("/api/profile")).await
    }

    /// GET /api/profile/{userId} - Someone else's profile.
    pub async fn get_user_profile(&self, user_id: &str) -> Result<Profile> {
        self.json(self.get(&format!("/api/profile/{}", user_id))).await
    }

    /// PUT /api/profile
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<Profile> {
        self.json(self.put("/api/profile").json(request)).await
    }

    /// PUT /api/profile/picture - Point the profile at an uploaded file.
    pub async fn set_profile_picture(&self, picture_url: &str) -> Result<()> {
        let request = ProfilePictureRequest {
            picture_url: picture_url.to_string(),
        };
        self.unit(self.put("/api/profile/picture").json(&request)).await
    }
}

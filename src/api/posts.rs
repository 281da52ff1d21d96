//! Post, like and comment endpoints.
//!
//! Every mutation answers with the full updated post.

use serde_json::json;

use super::ApiClient;
use crate::errors::Result;
use crate::models::{CreateCommentRequest, CreatePostRequest, Post};

impl ApiClient {
    /// GET /api/posts - The feed, newest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        self.json(self.get("/api/posts")).await
    }

    /// GET /api/posts/user/{userId}
    pub async fn list_user_posts(&self, user_id: &str) -> Result<Vec<Post>> {
        self.json(self.get(&format!("/api/posts/user/{}", user_id))).await
    }

    /// POST /api/posts
    pub async fn create_post(&self, request: &CreatePostRequest) -> Result<Post> {
        self.json(self.post("/api/posts").json(request)).await
    }

    /// DELETE /api/posts/{id}
    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        self.unit(self.delete(&format!("/api/posts/{}", post_id))).await
    }

    /// POST /api/posts/{id}/like - Toggles the caller's like.
    pub async fn like_post(&self, post_id: &str) -> Result<Post> {
        self.json(
            self.post(&format!("/api/posts/{}/like", post_id))
                .json(&json!({})),
        )
        .await
    }

    /// POST /api/posts/{id}/comments
    pub async fn add_comment(&self, post_id: &str, content: &str) -> Result<Post> {
        let request = CreateCommentRequest {
            content: content.to_string(),
        };
        self.json(
            self.post(&format!("/api/posts/{}/comments", post_id))
                .json(&request),
        )
        .await
    }

    /// DELETE /api/posts/{id}/comments/{commentId}
    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<Post> {
        self.json(self.delete(&format!(
            "/api/posts/{}/comments/{}",
            post_id, comment_id
        )))
        .await
    }

    /// POST /api/posts/{id}/comments/{commentId}/like - Toggles the caller's like.
    pub async fn like_comment(&self, post_id: &str, comment_id: &str) -> Result<Post> {
        self.json(
            self.post(&format!(
                "/api/posts/{}/comments/{}/like",
                post_id, comment_id
            ))
            .json(&json!({})),
        )
        .await
    }
}

//! Post and comment models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::split_list;
use crate::reconcile::Entity;

/// A comment owned by exactly one post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Comment {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|l| l == user_id)
    }
}

/// A feed post with media attachments, likes and comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_category: Option<String>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|l| l == user_id)
    }

    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}

impl Entity for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Request body for `POST /api/posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: String,
    pub skill_category: String,
    pub tags: Vec<String>,
    pub media_urls: Vec<String>,
}

/// Draft of a post before its media have been uploaded.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub content: String,
    pub skill_category: String,
    /// Comma separated tag input.
    pub tags: String,
}

impl PostDraft {
    pub fn into_request(self, media_urls: Vec<String>) -> CreatePostRequest {
        CreatePostRequest {
            content: self.content,
            skill_category: self.skill_category,
            tags: split_list(&self.tags),
            media_urls,
        }
    }
}

/// Request body for `POST /api/posts/{id}/comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_deserializes_backend_document() {
        let post: Post = serde_json::from_str(
            r#"{
                "id": "p1",
                "userId": "u1",
                "content": "hello",
                "mediaUrls": ["http://localhost:8081/api/files/a.png"],
                "tags": ["rust"],
                "skillCategory": "Programming",
                "likes": ["u2"],
                "comments": [{"id": "c1", "userId": "u2", "content": "hi", "likes": [],
                              "createdAt": "2024-05-01T10:00:00.123"}],
                "createdAt": "2024-05-01T09:00:00"
            }"#,
        )
        .unwrap();

        assert!(post.is_liked_by("u2"));
        assert!(!post.is_liked_by("u1"));
        assert_eq!(post.comment("c1").map(|c| c.content.as_str()), Some("hi"));
        assert!(post.created_at.is_some());
    }

    #[test]
    fn test_draft_splits_tags() {
        let request = PostDraft {
            content: "post".to_string(),
            skill_category: String::new(),
            tags: "rust, async,,".to_string(),
        }
        .into_request(vec!["a".to_string()]);

        assert_eq!(request.tags, vec!["rust", "async"]);
        assert_eq!(request.media_urls, vec!["a"]);
    }
}

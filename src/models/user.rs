//! User, session identity and profile models.

use serde::{Deserialize, Serialize};

use crate::reconcile::Entity;

/// Avatar shown whenever a user has no picture or cannot be resolved.
pub const PLACEHOLDER_AVATAR: &str = "/default-avatar.png";
pub const ANONYMOUS_NAME: &str = "Someone";
pub const ANONYMOUS_USERNAME: &str = "someone";

/// The authenticated identity returned by `GET /api/auth/user`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl Identity {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn avatar(&self) -> &str {
        self.profile_picture.as_deref().unwrap_or(PLACEHOLDER_AVATAR)
    }
}

/// Envelope of the auth check endpoint.
///
/// The backend answers `{"user": {...}}` when a session exists and
/// `{"error": "Not authenticated"}` otherwise, both with status 200.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUserResponse {
    #[serde(default)]
    pub user: Option<Identity>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Full user profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default)]
    pub followers: Vec<String>,
}

impl Profile {
    pub fn is_followed_by(&self, user_id: &str) -> bool {
        self.followers.iter().any(|f| f == user_id)
    }
}

impl Entity for Profile {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Request body for `PUT /api/profile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: String,
    pub bio: String,
    pub location: String,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
}

impl UpdateProfileRequest {
    /// Build a request from comma separated skill and interest inputs.
    pub fn from_form(name: &str, bio: &str, location: &str, skills: &str, interests: &str) -> Self {
        Self {
            name: name.to_string(),
            bio: bio.to_string(),
            location: location.to_string(),
            skills: split_list(skills),
            interests: split_list(interests),
        }
    }
}

/// Request body for `PUT /api/profile/picture`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePictureRequest {
    pub picture_url: String,
}

/// Raw body of `GET /api/users/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLookup {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Display information for a user, cached per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
}

impl UserSummary {
    /// Stand-in used when a lookup fails or a field is missing.
    pub fn placeholder(id: &str) -> Self {
        let short: String = id.chars().take(4).collect();
        Self {
            id: id.to_string(),
            name: format!("User {}", short),
            username: format!("user{}", short),
            avatar: PLACEHOLDER_AVATAR.to_string(),
        }
    }

    /// Stand-in for a notification that names no sender.
    pub fn anonymous() -> Self {
        Self {
            id: String::new(),
            name: ANONYMOUS_NAME.to_string(),
            username: ANONYMOUS_USERNAME.to_string(),
            avatar: PLACEHOLDER_AVATAR.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder(&self.id) || *self == Self::anonymous()
    }
}

impl From<UserLookup> for UserSummary {
    fn from(lookup: UserLookup) -> Self {
        let fallback = UserSummary::placeholder(&lookup.id);
        Self {
            name: lookup.name.unwrap_or(fallback.name),
            username: lookup.username.unwrap_or(fallback.username),
            avatar: lookup
                .avatar
                .or(lookup.profile_picture)
                .unwrap_or(fallback.avatar),
            id: lookup.id,
        }
    }
}

/// Split a comma separated input into trimmed, non-empty entries.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_uses_id_prefix() {
        let summary = UserSummary::placeholder("abcdef123");
        assert_eq!(summary.name, "User abcd");
        assert_eq!(summary.username, "userabcd");
        assert_eq!(summary.avatar, PLACEHOLDER_AVATAR);
        assert!(summary.is_placeholder());
    }

    #[test]
    fn test_anonymous_has_a_name() {
        let summary = UserSummary::anonymous();
        assert_eq!(summary.name, "Someone");
        assert_eq!(summary.username, "someone");
        assert!(summary.is_placeholder());
    }

    #[test]
    fn test_lookup_fills_missing_fields() {
        let lookup: UserLookup =
            serde_json::from_str(r#"{"id":"u1xyz","name":"Ada"}"#).unwrap();
        let summary = UserSummary::from(lookup);
        assert_eq!(summary.name, "Ada");
        assert_eq!(summary.username, "useru1xy");
        assert_eq!(summary.avatar, PLACEHOLDER_AVATAR);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" rust, ,go ,"), vec!["rust", "go"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_auth_envelope_unauthenticated() {
        let body: AuthUserResponse =
            serde_json::from_str(r#"{"error":"Not authenticated"}"#).unwrap();
        assert!(body.user.is_none());
        assert_eq!(body.error.as_deref(), Some("Not authenticated"));
    }
}

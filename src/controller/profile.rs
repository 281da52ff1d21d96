//! Profiles: the caller's own and those of other users.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Outcome, SingleFlight};
use crate::api::{validate_profile_picture, ApiClient, MediaFile, ProgressFn};
use crate::errors::{ClientError, Result};
use crate::models::{Profile, UpdateProfileRequest};
use crate::reconcile::EntityList;
use crate::session::SessionAccessor;

pub struct ProfileController {
    api: ApiClient,
    session: Arc<dyn SessionAccessor>,
    own: RwLock<Option<Profile>>,
    viewed: RwLock<EntityList<Profile>>,
    flights: SingleFlight,
}

impl ProfileController {
    pub fn new(api: ApiClient, session: Arc<dyn SessionAccessor>) -> Self {
        Self {
            api,
            session,
            own: RwLock::new(None),
            viewed: RwLock::new(EntityList::new()),
            flights: SingleFlight::new(),
        }
    }

    /// Fetch the caller's own profile.
    pub async fn load(&self) -> Result<Profile> {
        self.session.require_identity()?;
        let profile = self.api.get_profile().await.map_err(|e| {
            tracing::warn!("Failed to fetch profile: {}", e);
            e
        })?;
        *self.own.write().await = Some(profile.clone());
        Ok(profile)
    }

    pub async fn own(&self) -> Option<Profile> {
        self.own.read().await.clone()
    }

    /// Fetch another user's profile.
    pub async fn view(&self, user_id: &str) -> Result<Profile> {
        let profile = self.api.get_user_profile(user_id).await?;
        self.viewed.write().await.upsert(profile.clone());
        Ok(profile)
    }

    pub async fn viewed(&self, user_id: &str) -> Option<Profile> {
        self.viewed.read().await.get(user_id).cloned()
    }

    pub async fn update(&self, request: UpdateProfileRequest) -> Result<Outcome<Profile>> {
        if request.name.trim().is_empty() {
            return Err(ClientError::Validation("Name is required".to_string()));
        }
        self.session.require_identity()?;
        let Some(_guard) = self.flights.try_begin("profile:update") else {
            return Ok(Outcome::Busy);
        };

        let profile = self.api.update_profile(&request).await.map_err(|e| {
            tracing::warn!("Failed to update profile: {}", e);
            e
        })?;
        *self.own.write().await = Some(profile.clone());
        Ok(Outcome::Applied(profile))
    }

    /// Upload a new picture, point the profile at it and re-read the profile.
    pub async fn change_picture(
        &self,
        file: MediaFile,
        progress: Option<ProgressFn>,
    ) -> Result<Outcome<Profile>> {
        validate_profile_picture(&file)?;
        self.session.require_identity()?;
        let Some(_guard) = self.flights.try_begin("profile:picture") else {
            return Ok(Outcome::Busy);
        };

        let url = self.api.upload(&file, progress).await.map_err(|e| {
            tracing::warn!("Failed to upload profile picture: {}", e);
            e
        })?;
        self.api.set_profile_picture(&url).await.map_err(|e| {
            tracing::warn!("Failed to set profile picture: {}", e);
            e
        })?;
        let profile = self.api.get_profile().await?;
        *self.own.write().await = Some(profile.clone());
        Ok(Outcome::Applied(profile))
    }

    /// Whether the caller follows `user_id`, judged from the last copy of
    /// that user's profile.
    pub async fn is_following(&self, user_id: &str) -> bool {
        let Some(identity) = self.session.identity() else {
            return false;
        };
        if let Some(profile) = self.viewed.read().await.get(user_id) {
            return profile.is_followed_by(&identity.id);
        }
        self.own
            .read()
            .await
            .as_ref()
            .is_some_and(|own| own.following.iter().any(|f| f == user_id))
    }

    /// Follow `user_id`, or unfollow if already following. The returned
    /// profile of the target replaces the local copy.
    pub async fn toggle_follow(&self, user_id: &str) -> Result<Outcome<Profile>> {
        let identity = self.session.require_identity()?;
        if identity.id == user_id {
            return Err(ClientError::Validation("You cannot follow yourself".to_string()));
        }
        let Some(_guard) = self.flights.try_begin(format!("follow:{}", user_id)) else {
            return Ok(Outcome::Busy);
        };

        let following = self.is_following(user_id).await;
        let result = if following {
            self.api.unfollow_user(user_id).await
        } else {
            self.api.follow_user(user_id).await
        };
        let profile = result.map_err(|e| {
            tracing::warn!("Failed to toggle follow on {}: {}", user_id, e);
            e
        })?;
        self.viewed.write().await.upsert(profile.clone());
        Ok(Outcome::Applied(profile))
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.flights.is_pending(key)
    }
}

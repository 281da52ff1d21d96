//! Communities: discovery, membership and chat entry.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Outcome, SingleFlight};
use crate::api::ApiClient;
use crate::chat::ChatRoom;
use crate::errors::{ClientError, Result};
use crate::models::{Community, CreateCommunityRequest};
use crate::realtime::BrokerClient;
use crate::reconcile::{EntityList, UserDirectory};
use crate::session::SessionAccessor;

pub struct CommunityController {
    api: ApiClient,
    session: Arc<dyn SessionAccessor>,
    directory: Arc<UserDirectory>,
    all: RwLock<EntityList<Community>>,
    mine: RwLock<EntityList<Community>>,
    flights: SingleFlight,
}

impl CommunityController {
    pub fn new(
        api: ApiClient,
        session: Arc<dyn SessionAccessor>,
        directory: Arc<UserDirectory>,
    ) -> Self {
        Self {
            api,
            session,
            directory,
            all: RwLock::new(EntityList::new()),
            mine: RwLock::new(EntityList::new()),
            flights: SingleFlight::new(),
        }
    }

    /// Load every community, plus the caller's own when logged in.
    pub async fn load(&self) -> Result<usize> {
        let all = self.api.list_communities().await.map_err(|e| {
            tracing::warn!("Failed to fetch communities: {}", e);
            e
        })?;
        let count = all.len();
        self.all.write().await.replace_all(all);

        if let Some(identity) = self.session.identity() {
            let mine = self.api.list_user_communities(&identity.id).await?;
            self.mine.write().await.replace_all(mine);
        }
        Ok(count)
    }

    pub async fn communities(&self) -> Vec<Community> {
        self.all.read().await.as_slice().to_vec()
    }

    pub async fn my_communities(&self) -> Vec<Community> {
        self.mine.read().await.as_slice().to_vec()
    }

    pub async fn community(&self, community_id: &str) -> Option<Community> {
        if let Some(c) = self.all.read().await.get(community_id) {
            return Some(c.clone());
        }
        self.mine.read().await.get(community_id).cloned()
    }

    pub async fn create(&self, mut request: CreateCommunityRequest) -> Result<Outcome<Community>> {
        request.name = request.name.trim().to_string();
        if request.name.is_empty() {
            return Err(ClientError::Validation("Community name is required".to_string()));
        }
        self.session.require_identity()?;
        let Some(_guard) = self.flights.try_begin("create:community") else {
            return Ok(Outcome::Busy);
        };

        let community = self.api.create_community(&request).await.map_err(|e| {
            tracing::warn!("Failed to create community: {}", e);
            e
        })?;
        self.all.write().await.upsert_back(community.clone());
        self.mine.write().await.upsert_back(community.clone());
        tracing::info!("Created community {}", community.id);
        Ok(Outcome::Applied(community))
    }

    /// Join a community the caller is not in, or leave one they are in.
    ///
    /// The backend returns nothing for either, so the local copy is replaced
    /// by one with the caller's membership changed.
    pub async fn toggle_membership(&self, community_id: &str) -> Result<Outcome<Community>> {
        let identity = self.session.require_identity()?;
        let Some(_guard) = self
            .flights
            .try_begin(format!("membership:{}", community_id))
        else {
            return Ok(Outcome::Busy);
        };
        let community = self
            .community(community_id)
            .await
            .ok_or_else(|| ClientError::Validation("Community not found".to_string()))?;

        let joining = !community.is_member(&identity.id);
        let result = if joining {
            self.api.join_community(community_id).await
        } else {
            self.api.leave_community(community_id).await
        };
        result.map_err(|e| {
            tracing::warn!(
                "Failed to {} community {}: {}",
                if joining { "join" } else { "leave" },
                community_id,
                e
            );
            e
        })?;

        let updated = community.with_membership(&identity.id, joining);
        self.all.write().await.replace_existing(updated.clone());
        {
            let mut mine = self.mine.write().await;
            if joining {
                mine.upsert_back(updated.clone());
            } else {
                mine.remove(community_id);
            }
        }
        Ok(Outcome::Applied(updated))
    }

    pub async fn unread_count(&self, community_id: &str) -> Result<u64> {
        self.api.community_unread_count(community_id).await
    }

    /// Open the chat of a community the caller belongs to.
    pub async fn open_chat(
        &self,
        community_id: &str,
        broker: Option<&BrokerClient>,
    ) -> Result<ChatRoom> {
        let identity = self.session.require_identity()?;
        if let Some(community) = self.community(community_id).await {
            if !community.is_member(&identity.id) {
                return Err(ClientError::Validation(
                    "Join the community to see its chat".to_string(),
                ));
            }
            if let Some(owner) = &community.owner_id {
                self.directory.resolve(&self.api, [owner]).await;
            }
        }
        ChatRoom::open(
            self.api.clone(),
            self.session.clone(),
            self.directory.clone(),
            community_id,
            broker,
        )
        .await
    }
}

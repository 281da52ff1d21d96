//! Application context.
//!
//! Everything a view needs is reachable from one [`App`]: the HTTP client,
//! the session, the user directory, the optional broker connection and the
//! controllers. Nothing is global.

use std::sync::{Arc, Mutex};

use crate::api::ApiClient;
use crate::chat::ChatRoom;
use crate::config::Config;
use crate::controller::{
    CommunityController, FeedController, LearningPlanController, NotificationCenter,
    ProfileController,
};
use crate::errors::Result;
use crate::models::Identity;
use crate::realtime::BrokerClient;
use crate::reconcile::UserDirectory;
use crate::session::{LogoutOutcome, SessionAccessor, SessionStore};

pub struct App {
    pub api: ApiClient,
    pub session: Arc<SessionStore>,
    pub directory: Arc<UserDirectory>,
    pub feed: FeedController,
    pub notifications: NotificationCenter,
    pub communities: CommunityController,
    pub plans: LearningPlanController,
    pub profile: ProfileController,
    broker: Mutex<Option<BrokerClient>>,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_api(ApiClient::new(config)?))
    }

    pub fn with_api(api: ApiClient) -> Self {
        let session = Arc::new(SessionStore::new(api.clone()));
        let accessor: Arc<dyn SessionAccessor> = session.clone();
        let directory = Arc::new(UserDirectory::new());

        Self {
            feed: FeedController::new(api.clone(), accessor.clone()),
            notifications: NotificationCenter::new(api.clone(), directory.clone()),
            communities: CommunityController::new(api.clone(), accessor.clone(), directory.clone()),
            plans: LearningPlanController::new(api.clone(), accessor.clone()),
            profile: ProfileController::new(api.clone(), accessor),
            api,
            session,
            directory,
            broker: Mutex::new(None),
        }
    }

    /// Check the session and, when logged in, connect to the broker for live
    /// notifications. A failed connection leaves the app in polling mode.
    pub async fn start(&self) -> Option<Identity> {
        let identity = self.session.check_session().await?;
        if let Err(e) = self.connect_realtime(&identity).await {
            tracing::warn!("Real-time channel unavailable, using polling: {}", e);
        }
        Some(identity)
    }

    async fn connect_realtime(&self, identity: &Identity) -> Result<()> {
        let broker = BrokerClient::connect(&self.api).await?;
        self.notifications.attach(&broker, &identity.id)?;
        if let Ok(mut slot) = self.broker.lock() {
            if let Some(previous) = slot.replace(broker) {
                previous.disconnect();
            }
        }
        Ok(())
    }

    /// The broker connection, if one is up.
    pub fn broker(&self) -> Option<BrokerClient> {
        self.broker
            .lock()
            .ok()
            .and_then(|b| b.clone())
            .filter(|b| b.is_connected())
    }

    pub async fn open_chat(&self, community_id: &str) -> Result<ChatRoom> {
        let broker = self.broker();
        self.communities.open_chat(community_id, broker.as_ref()).await
    }

    /// Tear down the live channel and end the session.
    pub async fn logout(&self) -> LogoutOutcome {
        self.notifications.detach();
        if let Some(broker) = self.broker.lock().ok().and_then(|mut b| b.take()) {
            broker.disconnect();
        }
        self.session.logout().await
    }
}

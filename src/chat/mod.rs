//! Community chat.
//!
//! A [`ChatRoom`] is one open chat view. How it delivers messages is decided
//! once when the room opens: over the broker when a live connection exists,
//! otherwise by posting and re-fetching the history.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::controller::{Outcome, SingleFlight};
use crate::errors::{ClientError, Result};
use crate::models::{ChatMessage, SendMessageRequest, UserSummary};
use crate::realtime::{community_send_destination, community_topic, BrokerClient, Subscription};
use crate::reconcile::{EntityList, UserDirectory};
use crate::session::SessionAccessor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    Live,
    Polling,
}

/// Delivers chat sends for one room.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    fn mode(&self) -> ChatMode;

    /// Send `content` to the community. Returns the refreshed history when the
    /// transport fetched it, or `None` when the message will arrive as a push.
    async fn send(&self, community_id: &str, content: &str) -> Result<Option<Vec<ChatMessage>>>;
}

/// Publishes over the broker. The saved message comes back on the community
/// topic, so nothing is fetched.
pub struct LiveChat {
    broker: BrokerClient,
}

impl LiveChat {
    pub fn new(broker: BrokerClient) -> Self {
        Self { broker }
    }
}

#[async_trait]
impl ChatTransport for LiveChat {
    fn mode(&self) -> ChatMode {
        ChatMode::Live
    }

    async fn send(&self, community_id: &str, content: &str) -> Result<Option<Vec<ChatMessage>>> {
        let request = SendMessageRequest {
            community_id: community_id.to_string(),
            content: content.to_string(),
        };
        self.broker
            .publish(&community_send_destination(community_id), &request)?;
        Ok(None)
    }
}

/// Posts the message, then fetches the history once.
pub struct PollingChat {
    api: ApiClient,
}

impl PollingChat {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ChatTransport for PollingChat {
    fn mode(&self) -> ChatMode {
        ChatMode::Polling
    }

    async fn send(&self, community_id: &str, content: &str) -> Result<Option<Vec<ChatMessage>>> {
        self.api.send_message(community_id, content).await?;
        let history = self.api.list_messages(community_id).await?;
        Ok(Some(history))
    }
}

/// Sort key for chat messages. Untimestamped messages sort last.
fn message_order(message: &ChatMessage) -> (bool, Option<NaiveDateTime>) {
    (message.timestamp.is_none(), message.timestamp)
}

fn sorted(mut messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    messages.sort_by_key(message_order);
    messages
}

/// Fold a fetched history into the local list. Messages only ever join the
/// list, so anything pushed while the fetch was in flight survives an older
/// snapshot.
fn merge_history(list: &mut EntityList<ChatMessage>, history: Vec<ChatMessage>) {
    for message in sorted(history) {
        list.upsert_sorted_by_key(message, message_order);
    }
}

/// An open community chat.
///
/// After [`ChatRoom::close`] (or drop) pushed messages are no longer consumed
/// and responses to requests still in flight are discarded.
pub struct ChatRoom {
    community_id: String,
    api: ApiClient,
    session: Arc<dyn SessionAccessor>,
    directory: Arc<UserDirectory>,
    transport: Box<dyn ChatTransport>,
    messages: Arc<RwLock<EntityList<ChatMessage>>>,
    closed: Arc<AtomicBool>,
    flights: SingleFlight,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl ChatRoom {
    /// Open the chat of `community_id`.
    ///
    /// Uses the broker when `broker` is connected and the topic subscription
    /// succeeds, polling otherwise. Loads the history, marks the community
    /// read and resolves every sender.
    pub async fn open(
        api: ApiClient,
        session: Arc<dyn SessionAccessor>,
        directory: Arc<UserDirectory>,
        community_id: &str,
        broker: Option<&BrokerClient>,
    ) -> Result<Self> {
        let live = match broker.filter(|b| b.is_connected()) {
            Some(broker) => match broker.subscribe(&community_topic(community_id)) {
                Ok(subscription) => Some((broker.clone(), subscription)),
                Err(e) => {
                    tracing::warn!("Falling back to polling for {}: {}", community_id, e);
                    None
                }
            },
            None => None,
        };

        let (transport, subscription): (Box<dyn ChatTransport>, Option<Subscription>) = match live {
            Some((broker, subscription)) => (Box::new(LiveChat::new(broker)), Some(subscription)),
            None => (Box::new(PollingChat::new(api.clone())), None),
        };

        let room = Self {
            community_id: community_id.to_string(),
            api,
            session,
            directory,
            transport,
            messages: Arc::new(RwLock::new(EntityList::new())),
            closed: Arc::new(AtomicBool::new(false)),
            flights: SingleFlight::new(),
            pump: Mutex::new(None),
        };
        tracing::info!("Opened chat {} ({:?})", community_id, room.mode());

        if let Some(subscription) = subscription {
            room.start_pump(subscription);
        }

        room.refresh().await?;
        if let Err(e) = room.api.mark_community_read(community_id).await {
            tracing::warn!("Failed to mark community {} read: {}", community_id, e);
        }
        Ok(room)
    }

    fn start_pump(&self, mut subscription: Subscription) {
        let messages = self.messages.clone();
        let closed = self.closed.clone();
        let directory = self.directory.clone();
        let api = self.api.clone();
        let community_id = self.community_id.clone();

        let handle = tokio::spawn(async move {
            while let Some(message) = subscription.next_json::<ChatMessage>().await {
                if closed.load(Ordering::SeqCst) {
                    break;
                }
                if message.community_id != community_id {
                    tracing::debug!("Ignoring message for community {}", message.community_id);
                    continue;
                }
                directory.resolve(&api, [&message.sender_id]).await;
                messages
                    .write()
                    .await
                    .upsert_sorted_by_key(message, message_order);
            }
        });
        if let Ok(mut pump) = self.pump.lock() {
            *pump = Some(handle);
        }
    }

    pub fn community_id(&self) -> &str {
        &self.community_id
    }

    pub fn mode(&self) -> ChatMode {
        self.transport.mode()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().await.as_slice().to_vec()
    }

    pub async fn sender(&self, message: &ChatMessage) -> UserSummary {
        self.directory.get(&message.sender_id).await
    }

    /// Re-fetch the history and merge it in. Used on open and as the poll in
    /// polling mode.
    pub async fn refresh(&self) -> Result<usize> {
        let history = self.api.list_messages(&self.community_id).await.map_err(|e| {
            tracing::warn!("Failed to fetch messages for {}: {}", self.community_id, e);
            e
        })?;
        Ok(self.adopt(history).await)
    }

    /// Send the text in `draft`, clearing it once the send is accepted.
    pub async fn send(&self, draft: &mut String) -> Result<Outcome<()>> {
        let content = draft.trim().to_string();
        if content.is_empty() {
            return Err(ClientError::Validation("Message cannot be empty".to_string()));
        }
        if self.is_closed() {
            return Err(ClientError::Realtime("Chat is closed".to_string()));
        }
        self.session.require_identity()?;
        let Some(_guard) = self.flights.try_begin("send") else {
            return Ok(Outcome::Busy);
        };

        let refreshed = self
            .transport
            .send(&self.community_id, &content)
            .await
            .map_err(|e| {
                tracing::warn!("Failed to send message to {}: {}", self.community_id, e);
                e
            })?;
        if let Some(history) = refreshed {
            self.adopt(history).await;
        }
        draft.clear();
        Ok(Outcome::Applied(()))
    }

    async fn adopt(&self, history: Vec<ChatMessage>) -> usize {
        if self.is_closed() {
            tracing::debug!("Discarding history for closed chat {}", self.community_id);
            return 0;
        }
        let senders: Vec<String> = history.iter().map(|m| m.sender_id.clone()).collect();
        self.directory.resolve(&self.api, senders).await;

        let mut messages = self.messages.write().await;
        merge_history(&mut messages, history);
        messages.len()
    }

    /// Stop consuming pushed messages. Dropping the pump's subscription
    /// unsubscribes from the topic.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut pump) = self.pump.lock() {
            if let Some(handle) = pump.take() {
                handle.abort();
            }
        }
        tracing::info!("Closed chat {}", self.community_id);
    }
}

impl Drop for ChatRoom {
    fn drop(&mut self) {
        self.close();
    }
}

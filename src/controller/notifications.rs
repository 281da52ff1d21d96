//! Notification center: list, unread counter and live delivery.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use super::SingleFlight;
use crate::api::ApiClient;
use crate::errors::Result;
use crate::models::{Notification, UserSummary};
use crate::realtime::{notification_queue, BrokerClient};
use crate::reconcile::{NotificationList, UserDirectory};

const TOAST_CAPACITY: usize = 32;

pub struct NotificationCenter {
    api: ApiClient,
    directory: Arc<UserDirectory>,
    list: Arc<RwLock<NotificationList>>,
    flights: SingleFlight,
    toasts: broadcast::Sender<Notification>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationCenter {
    pub fn new(api: ApiClient, directory: Arc<UserDirectory>) -> Self {
        let (toasts, _) = broadcast::channel(TOAST_CAPACITY);
        Self {
            api,
            directory,
            list: Arc::new(RwLock::new(NotificationList::new())),
            flights: SingleFlight::new(),
            toasts,
            pump: Mutex::new(None),
        }
    }

    /// Fetch the full list and resolve every sender.
    pub async fn load(&self) -> Result<usize> {
        let notifications = self.api.list_notifications().await.map_err(|e| {
            tracing::warn!("Failed to fetch notifications: {}", e);
            e
        })?;
        let senders: Vec<String> = notifications
            .iter()
            .filter_map(|n| n.sender_id.clone())
            .collect();
        let count = {
            let mut list = self.list.write().await;
            list.replace_all(notifications);
            list.len()
        };
        self.directory.resolve(&self.api, senders).await;
        Ok(count)
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.list.read().await.as_slice().to_vec()
    }

    pub async fn unread_count(&self) -> usize {
        self.list.read().await.unread_count()
    }

    /// The unread count as the server sees it, for a badge shown before the
    /// list is loaded.
    pub async fn server_unread_count(&self) -> Result<u64> {
        self.api.unread_notification_count().await
    }

    /// Display information for whoever triggered a notification.
    pub async fn sender(&self, notification: &Notification) -> UserSummary {
        match &notification.sender_id {
            Some(id) => self.directory.get(id).await,
            None => UserSummary::anonymous(),
        }
    }

    /// Mark one notification read.
    ///
    /// The counter drops before the request is sent; the entry's flag flips
    /// on acknowledgment. Returns false when the entry is unknown, already
    /// read, or already being marked.
    pub async fn mark_read(&self, notification_id: &str) -> Result<bool> {
        if !self.list.write().await.begin_read(notification_id) {
            return Ok(false);
        }

        match self.api.mark_notification_read(notification_id).await {
            Ok(()) => {
                self.list.write().await.confirm_read(notification_id);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Failed to mark notification {} read: {}", notification_id, e);
                self.list.write().await.abort_read(notification_id);
                Err(e)
            }
        }
    }

    pub async fn mark_all_read(&self) -> Result<bool> {
        let Some(_guard) = self.flights.try_begin("notifications:mark-all") else {
            return Ok(false);
        };
        self.api.mark_all_notifications_read().await.map_err(|e| {
            tracing::warn!("Failed to mark all notifications read: {}", e);
            e
        })?;
        self.list.write().await.mark_all_read();
        Ok(true)
    }

    pub async fn delete(&self, notification_id: &str) -> Result<bool> {
        let Some(_guard) = self
            .flights
            .try_begin(format!("notifications:delete:{}", notification_id))
        else {
            return Ok(false);
        };
        self.api
            .delete_notification(notification_id)
            .await
            .map_err(|e| {
                tracing::warn!("Failed to delete notification {}: {}", notification_id, e);
                e
            })?;
        Ok(self.list.write().await.remove(notification_id).is_some())
    }

    pub async fn clear_all(&self) -> Result<bool> {
        let Some(_guard) = self.flights.try_begin("notifications:clear-all") else {
            return Ok(false);
        };
        self.api.clear_notifications().await.map_err(|e| {
            tracing::warn!("Failed to clear notifications: {}", e);
            e
        })?;
        self.list.write().await.clear();
        Ok(true)
    }

    /// Pushed notifications, for transient toasts.
    pub fn toasts(&self) -> broadcast::Receiver<Notification> {
        self.toasts.subscribe()
    }

    /// Start merging notifications pushed to `user_id`'s queue. Replaces any
    /// earlier subscription.
    pub fn attach(&self, broker: &BrokerClient, user_id: &str) -> Result<()> {
        let mut subscription = broker.subscribe(&notification_queue(user_id))?;
        let list = self.list.clone();
        let directory = self.directory.clone();
        let api = self.api.clone();
        let toasts = self.toasts.clone();

        let handle = tokio::spawn(async move {
            while let Some(notification) = subscription.next_json::<Notification>().await {
                tracing::debug!("Received notification {}", notification.id);
                if let Some(sender) = &notification.sender_id {
                    directory.resolve(&api, [sender]).await;
                }
                list.write().await.receive(notification.clone());
                // No receivers just means nobody is showing toasts.
                let _ = toasts.send(notification);
            }
            tracing::debug!("Notification stream ended");
        });

        if let Ok(mut pump) = self.pump.lock() {
            if let Some(previous) = pump.replace(handle) {
                previous.abort();
            }
        }
        Ok(())
    }

    /// Stop consuming pushed notifications.
    pub fn detach(&self) {
        if let Ok(mut pump) = self.pump.lock() {
            if let Some(handle) = pump.take() {
                handle.abort();
            }
        }
    }

    pub fn is_attached(&self) -> bool {
        self.pump
            .lock()
            .map(|p| p.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        self.detach();
    }
}

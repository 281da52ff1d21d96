//! Notification endpoints.

use serde_json::json;

use super::ApiClient;
use crate::errors::Result;
use crate::models::{Notification, UnreadCount};

impl ApiClient {
    /// GET /api/notifications - The caller's notifications, newest first.
    pub async fn list_notifications(&self) -> Result<Vec<Notification>> {
        self.json(self.get("/api/notifications")).await
    }

    /// GET /api/notifications/unread-count
    pub async fn unread_notification_count(&self) -> Result<u64> {
        let body: UnreadCount = self
            .json(self.get("/api/notifications/unread-count"))
            .await?;
        Ok(body.count)
    }

    /// PUT /api/notifications/{id}/read
    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<()> {
        self.unit(
            self.put(&format!("/api/notifications/{}/read", notification_id))
                .json(&json!({})),
        )
        .await
    }

    /// PUT /api/notifications/mark-all-read
    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        self.unit(self.put("/api/notifications/mark-all-read").json(&json!({}))).await
    }

    /// DELETE /api/notifications/{id}
    pub async fn delete_notification(&self, notification_id: &str) -> Result<()> {
        self.unit(self.delete(&format!("/api/notifications/{}", notification_id))).await
    }

    /// DELETE /api/notifications/clear-all
    pub async fn clear_notifications(&self) -> Result<()> {
        self.unit(self.delete("/api/notifications/clear-all")).await
    }
}

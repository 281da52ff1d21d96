//! Notification list with unread bookkeeping.

use std::collections::HashSet;

use super::{EntityList, Upsert};
use crate::models::Notification;

/// Notifications, newest first, with a derived unread counter.
///
/// A mark-as-read in flight lowers the counter at once while the entry keeps
/// `read == false` until the server acknowledges it. Once every request has
/// settled the counter equals the number of entries with `read == false`.
///
/// Entries pushed since the last fetch are kept when a fetched list that
/// predates them is adopted.
#[derive(Debug, Clone, Default)]
pub struct NotificationList {
    items: EntityList<Notification>,
    pending_read: HashSet<String>,
    pushed: HashSet<String>,
}

impl NotificationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a fetched list.
    pub fn replace_all(&mut self, notifications: Vec<Notification>) {
        let mut fresh = EntityList::from_vec(notifications);
        let missing: Vec<Notification> = self
            .items
            .iter()
            .filter(|n| self.pushed.contains(&n.id) && !fresh.contains(&n.id))
            .cloned()
            .collect();
        for notification in missing.into_iter().rev() {
            fresh.upsert(notification);
        }
        self.items = fresh;
        self.pushed.clear();

        let items = &self.items;
        self.pending_read
            .retain(|id| items.get(id).is_some_and(|n| !n.read));
    }

    /// Merge a pushed notification.
    pub fn receive(&mut self, notification: Notification) -> Upsert {
        if notification.read {
            self.pending_read.remove(&notification.id);
        }
        self.pushed.insert(notification.id.clone());
        self.items.upsert(notification)
    }

    pub fn unread_count(&self) -> usize {
        self.items
            .iter()
            .filter(|n| !n.read && !self.pending_read.contains(&n.id))
            .count()
    }

    /// Start a mark-as-read. Returns false when there is nothing to do.
    pub fn begin_read(&mut self, id: &str) -> bool {
        match self.items.get(id) {
            Some(n) if !n.read => self.pending_read.insert(id.to_string()),
            _ => false,
        }
    }

    /// Server acknowledged the mark-as-read.
    pub fn confirm_read(&mut self, id: &str) {
        self.pending_read.remove(id);
        if let Some(n) = self.items.get_mut(id) {
            n.read = true;
        }
    }

    /// Mark-as-read failed; the entry counts as unread again.
    pub fn abort_read(&mut self, id: &str) {
        self.pending_read.remove(id);
    }

    pub fn mark_all_read(&mut self) {
        self.pending_read.clear();
        for n in self.items.iter_mut() {
            n.read = true;
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Notification> {
        self.pending_read.remove(id);
        self.pushed.remove(id);
        self.items.remove(id)
    }

    pub fn clear(&mut self) {
        self.pending_read.clear();
        self.pushed.clear();
        self.items.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.get(id)
    }

    pub fn as_slice(&self) -> &[Notification] {
        self.items.as_slice()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(id: &str, read: bool) -> Notification {
        Notification {
            id: id.to_string(),
            recipient_id: None,
            sender_id: Some("u2".to_string()),
            kind: None,
            content: format!("notification {}", id),
            related_entity_id: None,
            read,
            created_at: None,
        }
    }

    fn list() -> NotificationList {
        let mut list = NotificationList::new();
        list.replace_all(vec![
            notification("n1", false),
            notification("n2", true),
            notification("n3", false),
        ]);
        list
    }

    fn unread_flags(list: &NotificationList) -> usize {
        list.as_slice().iter().filter(|n| !n.read).count()
    }

    #[test]
    fn test_counter_matches_flags() {
        let list = list();
        assert_eq!(list.unread_count(), 2);
        assert_eq!(list.unread_count(), unread_flags(&list));
    }

    #[test]
    fn test_read_lowers_counter_before_ack() {
        let mut list = list();
        assert!(list.begin_read("n1"));
        assert_eq!(list.unread_count(), 1);
        assert!(!list.get("n1").unwrap().read);

        list.confirm_read("n1");
        assert!(list.get("n1").unwrap().read);
        assert_eq!(list.unread_count(), unread_flags(&list));
    }

    #[test]
    fn test_failed_read_restores_counter() {
        let mut list = list();
        list.begin_read("n3");
        list.abort_read("n3");
        assert_eq!(list.unread_count(), 2);
    }

    #[test]
    fn test_begin_read_on_read_entry_is_noop() {
        let mut list = list();
        assert!(!list.begin_read("n2"));
        assert!(!list.begin_read("missing"));
        assert!(list.begin_read("n1"));
        assert!(!list.begin_read("n1"));
        assert_eq!(list.unread_count(), 1);
    }

    #[test]
    fn test_mark_all() {
        let mut list = list();
        list.begin_read("n1");
        list.mark_all_read();
        assert_eq!(list.unread_count(), 0);
        assert!(list.as_slice().iter().all(|n| n.read));
    }

    #[test]
    fn test_remove_unread_lowers_counter() {
        let mut list = list();
        list.remove("n3");
        assert_eq!(list.unread_count(), 1);
        list.remove("n2");
        assert_eq!(list.unread_count(), 1);
    }

    #[test]
    fn test_push_prepends_and_counts() {
        let mut list = list();
        assert_eq!(list.receive(notification("n4", false)), Upsert::Inserted);
        assert_eq!(list.as_slice()[0].id, "n4");
        assert_eq!(list.unread_count(), 3);
        assert_eq!(list.receive(notification("n4", false)), Upsert::Replaced);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_older_fetch_keeps_pushed_entries() {
        let mut list = list();
        list.receive(notification("n5", false));
        list.receive(notification("n4", false));
        list.replace_all(vec![notification("n1", false), notification("n2", true)]);
        let ids: Vec<&str> = list.as_slice().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n4", "n5", "n1", "n2"]);
        assert_eq!(list.unread_count(), 3);

        // Once a fetch has been adopted the pushed entries are ordinary ones.
        list.replace_all(vec![notification("n1", false)]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_removed_push_is_not_restored() {
        let mut list = list();
        list.receive(notification("n4", false));
        list.remove("n4");
        list.replace_all(vec![notification("n1", false)]);
        assert!(list.get("n4").is_none());
    }
}

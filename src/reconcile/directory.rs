//! Per-session cache of user display information.

use std::collections::{HashMap, HashSet};

use futures_util::stream::{self, StreamExt};
use tokio::sync::RwLock;

use crate::api::ApiClient;
use crate::models::UserSummary;

/// Lookups in flight at once during a resolve.
const LOOKUP_CONCURRENCY: usize = 8;

/// Resolved names and avatars by user id.
///
/// Entries never expire within a session. A failed lookup caches the
/// placeholder so the same id is not fetched again on every render.
#[derive(Debug, Default)]
pub struct UserDirectory {
    cache: RwLock<HashMap<String, UserSummary>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entry, or the placeholder if the id was never resolved.
    pub async fn get(&self, user_id: &str) -> UserSummary {
        self.cache
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserSummary::placeholder(user_id))
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        self.cache.read().await.contains_key(user_id)
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Resolve every id not yet cached.
    ///
    /// Lookups run concurrently, at most [`LOOKUP_CONCURRENCY`] at a time, and
    /// are collected before a single merge into the cache. Returns the number of ids that were fetched.
    pub async fn resolve<I, S>(&self, api: &ApiClient, user_ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let missing: Vec<String> = {
            let cache = self.cache.read().await;
            let mut seen = HashSet::new();
            user_ids
                .into_iter()
                .map(|id| id.as_ref().to_string())
                .filter(|id| !id.is_empty() && !cache.contains_key(id) && seen.insert(id.clone()))
                .collect()
        };
        if missing.is_empty() {
            return 0;
        }

        let resolved = stream::iter(missing.iter().cloned())
            .map(|id| async move {
                let summary = match api.get_user(&id).await {
                    Ok(lookup) => UserSummary::from(lookup),
                    Err(e) => {
                        tracing::warn!("Failed to resolve user {}: {}", id, e);
                        UserSummary::placeholder(&id)
                    }
                };
                (id, summary)
            })
            .buffer_unordered(LOOKUP_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        let mut cache = self.cache.write().await;
        for (id, summary) in resolved {
            cache.entry(id).or_insert(summary);
        }
        missing.len()
    }
}

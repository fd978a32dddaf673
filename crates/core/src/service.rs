//! Search service shared by the UI components.
//!
//! Owns the multicast autocomplete action stream, the active full-search state,
//! and the backend used for registry lookups.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::error::Result;
use crate::types::AggregateAutocompleteResponse;

/// Capacity of the autocomplete action stream. A slow subscriber that falls
/// further behind than this skips ahead to the newest values.
pub(crate) const ACTION_CHANNEL_CAPACITY: usize = 64;

/// Registry lookup used by [`SearchService::get_aggregate_autocomplete`].
#[async_trait]
pub trait AutocompleteBackend: Send + Sync {
    async fn aggregate_autocomplete(&self, query: &str) -> Result<AggregateAutocompleteResponse>;
}

pub struct SearchService {
    backend: Arc<dyn AutocompleteBackend>,
    actions: broadcast::Sender<String>,
    /// Queries pushed onto the action stream so far.
    sent: AtomicU64,
    active_search: watch::Sender<Option<String>>,
}

impl SearchService {
    pub fn new(backend: Arc<dyn AutocompleteBackend>) -> Self {
        let (actions, _) = broadcast::channel(ACTION_CHANNEL_CAPACITY);
        let (active_search, _) = watch::channel(None);
        Self { backend, actions, sent: AtomicU64::new(0), active_search }
    }

    /// Subscribe to the autocomplete action stream. Each receiver sees every
    /// query pushed after it subscribed.
    pub fn autocomplete_search_action(&self) -> broadcast::Receiver<String> {
        self.actions.subscribe()
    }

    /// Push a raw query onto the action stream.
    pub fn autocomplete(&self, query: &str) {
        self.sent.fetch_add(1, Ordering::SeqCst);
        // No subscribers is fine: nothing is listening for suggestions yet.
        let _ = self.actions.send(query.to_string());
    }

    /// Number of queries pushed with [`SearchService::autocomplete`].
    pub fn actions_sent(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }

    pub async fn get_aggregate_autocomplete(
        &self,
        query: &str,
    ) -> Result<AggregateAutocompleteResponse> {
        self.backend.aggregate_autocomplete(query).await
    }

    pub fn backend(&self) -> Arc<dyn AutocompleteBackend> {
        Arc::clone(&self.backend)
    }

    /// Start a full search for an exact name.
    pub fn search(&self, name: &str) {
        debug!(name, "Full search requested");
        self.active_search.send_replace(Some(name.to_string()));
    }

    pub fn clear_search(&self) {
        debug!("Search cleared");
        self.active_search.send_replace(None);
    }

    /// Name of the active full search, if any.
    pub fn search_state(&self) -> Option<String> {
        self.active_search.borrow().clone()
    }

    pub fn subscribe_search_state(&self) -> watch::Receiver<Option<String>> {
        self.active_search.subscribe()
    }
}

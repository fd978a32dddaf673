//! Direct autocomplete: every call looks the query up immediately and replaces
//! the displayed suggestion list.
//!
//! There is no debounce, dedup or cancellation here. Whichever lookup resolves
//! last owns the list, even if it was dispatched first.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::service::SearchService;
use crate::types::{AggregateAutocomplete, AggregateAutocompleteResponse};

/// Suggestion list state with pure transitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutocompleteList {
    pub results: Vec<AggregateAutocomplete>,
}

impl AutocompleteList {
    /// Validate and normalize a query. Clears the list and returns the trimmed
    /// query to look up, or leaves the list untouched and returns `None` for
    /// empty or blank input.
    pub fn begin(&mut self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.results.clear();
        Some(query.to_string())
    }

    pub fn complete(&mut self, response: AggregateAutocompleteResponse) {
        self.results = response.results;
    }
}

pub struct Search {
    service: Arc<SearchService>,
    list: Arc<watch::Sender<AutocompleteList>>,
}

impl Search {
    pub fn new(service: Arc<SearchService>) -> Self {
        let (list, _) = watch::channel(AutocompleteList::default());
        Self { service, list: Arc::new(list) }
    }

    /// Look `query` up on a spawned task. Returns `None` when the query is
    /// rejected and nothing was dispatched.
    pub fn autocomplete(&self, query: &str) -> Option<JoinHandle<()>> {
        let mut lookup = None;
        self.list.send_if_modified(|list| {
            lookup = list.begin(query);
            lookup.is_some()
        });
        let query = lookup?;

        debug!(query = %query, "Direct autocomplete lookup");
        let service = Arc::clone(&self.service);
        let list = Arc::clone(&self.list);
        Some(tokio::spawn(async move {
            match service.get_aggregate_autocomplete(&query).await {
                Ok(response) => list.send_modify(|l| l.complete(response)),
                Err(e) => warn!(query = %query, error = %e, "Direct autocomplete lookup failed"),
            }
        }))
    }

    pub fn results(&self) -> Vec<AggregateAutocomplete> {
        self.list.borrow().results.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutocompleteList> {
        self.list.subscribe()
    }
}

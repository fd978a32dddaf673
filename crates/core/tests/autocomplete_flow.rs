//! End-to-end tests for both search components over an in-memory registry.
//!
//! Time is paused, so debounce intervals and backend latency are exact.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use orgbook_core::input::SearchInput;
use orgbook_core::search::Search;
use orgbook_core::service::{AutocompleteBackend, SearchService};
use orgbook_core::types::{
    AggregateAutocomplete, AggregateAutocompleteResponse, AutocompleteConfig, FailurePolicy,
};
use orgbook_core::{Result, SearchError};

// ---------------------------------------------------------------------------
// In-memory registry
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Registry {
    names: Vec<&'static str>,
    latency: HashMap<&'static str, u64>,
    down: Mutex<bool>,
    calls: Mutex<Vec<String>>,
}

impl Registry {
    fn with_names(names: &[&'static str]) -> Self {
        Self { names: names.to_vec(), ..Default::default() }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AutocompleteBackend for Registry {
    async fn aggregate_autocomplete(&self, query: &str) -> Result<AggregateAutocompleteResponse> {
        self.calls.lock().unwrap().push(query.to_string());
        if let Some(ms) = self.latency.get(query) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        if *self.down.lock().unwrap() {
            return Err(SearchError::Backend("registry unavailable".into()));
        }
        let needle = query.to_uppercase();
        let results: Vec<AggregateAutocomplete> = self
            .names
            .iter()
            .filter(|name| name.contains(&needle))
            .map(|name| AggregateAutocomplete {
                kind: Some("name".into()),
                value: name.to_string(),
                ..Default::default()
            })
            .collect();
        let total = results.len() as u64;
        Ok(AggregateAutocompleteResponse { total, first_index: 1, last_index: total, results })
    }
}

const NAMES: &[&str] = &["ACME WIDGETS LTD.", "ACME HOLDINGS INC.", "BRAVO FOODS LTD."];

fn values(response: &AggregateAutocompleteResponse) -> Vec<&str> {
    response.results.iter().map(|r| r.value.as_str()).collect()
}

async fn wait(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// ---------------------------------------------------------------------------
// SearchInput
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn typing_a_name_shows_matching_suggestions() {
    let registry = Arc::new(Registry::with_names(NAMES));
    let service = Arc::new(SearchService::new(registry.clone()));
    let input = SearchInput::new(service, &AutocompleteConfig::default());

    for prefix in ["a", "ac", "acm", "acme"] {
        input.on_autocomplete(prefix);
        wait(50).await;
    }
    wait(300).await;

    assert_eq!(registry.calls(), vec!["acme"]);
    let vm = input.view_model().expect("view-model after first response");
    assert!(!vm.loading);
    assert_eq!(values(&vm.autocomplete_response), vec!["ACME WIDGETS LTD.", "ACME HOLDINGS INC."]);
}

#[tokio::test(start_paused = true)]
async fn clearing_the_field_empties_suggestions_without_a_lookup() {
    let registry = Arc::new(Registry::with_names(NAMES));
    let service = Arc::new(SearchService::new(registry.clone()));
    let input = SearchInput::new(service, &AutocompleteConfig::default());

    input.on_autocomplete("bravo");
    wait(400).await;
    input.on_autocomplete("");
    wait(400).await;

    assert_eq!(registry.calls(), vec!["bravo"]);
    let vm = input.view_model().unwrap();
    assert!(vm.autocomplete_response.is_empty());
    assert!(!vm.loading);
}

#[tokio::test(start_paused = true)]
async fn slow_earlier_lookup_does_not_replace_newer_suggestions() {
    let mut registry = Registry::with_names(NAMES);
    registry.latency.insert("acme", 2_000);
    let registry = Arc::new(registry);
    let service = Arc::new(SearchService::new(registry.clone()));
    let input = SearchInput::new(service, &AutocompleteConfig::default());
    let mut rx = input.subscribe();

    input.on_autocomplete("acme");
    wait(400).await;
    input.on_autocomplete("bravo");

    rx.changed().await.unwrap();
    let vm = rx.borrow_and_update().clone().unwrap();
    assert_eq!(values(&vm.autocomplete_response), vec!["BRAVO FOODS LTD."]);

    wait(3_000).await;
    assert_eq!(registry.calls(), vec!["acme", "bravo"]);
    assert!(!rx.has_changed().unwrap(), "stale acme result must not be published");
}

#[tokio::test(start_paused = true)]
async fn failure_with_reset_policy_stops_loading() {
    let registry = Arc::new(Registry::with_names(NAMES));
    let service = Arc::new(SearchService::new(registry.clone()));
    let config = AutocompleteConfig { failure_policy: FailurePolicy::Reset, ..Default::default() };
    let input = SearchInput::new(service, &config);

    input.on_autocomplete("acme");
    wait(400).await;
    *registry.down.lock().unwrap() = true;
    input.on_autocomplete("bravo");
    wait(400).await;

    let vm = input.view_model().unwrap();
    assert!(!vm.loading);
    assert_eq!(vm.error.as_deref(), Some("registry unavailable"));
    assert_eq!(vm.autocomplete_response.results.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn full_search_and_clear_go_through_the_service() {
    let registry = Arc::new(Registry::with_names(NAMES));
    let service = Arc::new(SearchService::new(registry));
    let mut input = SearchInput::new(Arc::clone(&service), &AutocompleteConfig::default());

    input.set_search_value("ACME WIDGETS LTD.");
    input.on_search("ACME WIDGETS LTD.");
    assert_eq!(service.search_state().as_deref(), Some("ACME WIDGETS LTD."));

    input.on_clear_search();
    assert_eq!(input.search_value(), "");
    assert_eq!(service.search_state(), None);
}

// ---------------------------------------------------------------------------
// Search (direct)
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn direct_lookup_trims_and_skips_blank_queries() {
    let registry = Arc::new(Registry::with_names(NAMES));
    let search = Search::new(Arc::new(SearchService::new(registry.clone())));

    search.autocomplete("  acme  ").unwrap().await.unwrap();
    assert!(search.autocomplete("   ").is_none());

    assert_eq!(registry.calls(), vec!["acme"]);
    assert_eq!(search.results().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn both_components_share_one_service() {
    let registry = Arc::new(Registry::with_names(NAMES));
    let service = Arc::new(SearchService::new(registry.clone()));
    let input = SearchInput::new(Arc::clone(&service), &AutocompleteConfig::default());
    let search = Search::new(Arc::clone(&service));

    search.autocomplete("bravo").unwrap().await.unwrap();
    assert_eq!(input.view_model(), None, "direct lookups do not feed the pipeline");

    input.on_autocomplete("acme");
    wait(400).await;
    assert_eq!(registry.calls(), vec!["bravo", "acme"]);
}

//! Application state: the shared search service plus global Dioxus signals
//! mirrored from the core components' channels.

use std::sync::Arc;

use dioxus::prelude::*;
use orgbook_core::service::SearchService;
use orgbook_core::types::{AggregateAutocomplete, AutocompleteConfig, ViewModel};

/// Service and config shared with every component through context.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SearchService>,
    pub config: AutocompleteConfig,
}

// ---------------------------------------------------------------------------
// Global signals
// ---------------------------------------------------------------------------

/// Contents of the search field
pub static QUERY: GlobalSignal<String> = Signal::global(|| String::new());

/// Latest view-model published by the autocomplete pipeline
pub static VIEW_MODEL: GlobalSignal<Option<ViewModel>> = Signal::global(|| None);

/// Name of the active full search
pub static ACTIVE_SEARCH: GlobalSignal<Option<String>> = Signal::global(|| None);

/// Suggestions shown by the quick lookup panel
pub static QUICK_RESULTS: GlobalSignal<Vec<AggregateAutocomplete>> = Signal::global(|| vec![]);

//! Search input component: the search field backed by the debounced
//! autocomplete pipeline.

use std::sync::Arc;

use tokio::sync::watch;

use crate::pipeline::{spawn_pipeline, PipelineHandle};
use crate::service::SearchService;
use crate::types::{AutocompleteConfig, ViewModel};

pub const SEARCH_LABEL: &str = "Registered BC Corporation Search";
pub const SEARCH_PLACEHOLDER: &str = "Start typing to search the OrgBook database";

pub struct SearchInput {
    service: Arc<SearchService>,
    pipeline: PipelineHandle,
    /// Value bound to the text field.
    search_value: String,
}

impl SearchInput {
    /// Create the component and start its pipeline. Must be called inside a
    /// tokio runtime.
    pub fn new(service: Arc<SearchService>, config: &AutocompleteConfig) -> Self {
        let pipeline = spawn_pipeline(&service, config);
        Self { service, pipeline, search_value: String::new() }
    }

    pub fn label(&self) -> &'static str {
        SEARCH_LABEL
    }

    pub fn placeholder(&self) -> &'static str {
        SEARCH_PLACEHOLDER
    }

    pub fn service(&self) -> &Arc<SearchService> {
        &self.service
    }

    pub fn on_autocomplete(&self, query: &str) {
        self.service.autocomplete(query);
    }

    pub fn on_search(&self, name: &str) {
        self.service.search(name);
    }

    pub fn on_clear_search(&mut self) {
        self.search_value.clear();
        self.service.clear_search();
    }

    pub fn search_value(&self) -> &str {
        &self.search_value
    }

    pub fn set_search_value(&mut self, value: impl Into<String>) {
        self.search_value = value.into();
    }

    /// Latest view-model, `None` until the first response arrives.
    pub fn view_model(&self) -> Option<ViewModel> {
        self.pipeline.view_model()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ViewModel>> {
        self.pipeline.subscribe()
    }

    /// Resolve once every query pushed so far has gone through the pipeline and
    /// its result, if any, has been published.
    pub async fn settled(&self) {
        self.pipeline.settled(self.service.actions_sent()).await;
    }
}

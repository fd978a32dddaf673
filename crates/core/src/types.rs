//! Core types shared across the OrgBook autocomplete crates: registry response
//! shapes, the combined view-model, and runtime configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Registry response types
// ---------------------------------------------------------------------------

/// One suggestion returned by the aggregate autocomplete endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateAutocomplete {
    /// Match kind reported by the registry (`name`, `source_id`, ...).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    /// Display text for the suggestion.
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,
}

/// Response body of the aggregate autocomplete endpoint.
///
/// Every field defaults, so an empty JSON object decodes to the same value as
/// [`AggregateAutocompleteResponse::default`]. That empty value is what the
/// pipeline publishes for a blank query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateAutocompleteResponse {
    pub total: u64,
    pub first_index: u64,
    pub last_index: u64,
    pub results: Vec<AggregateAutocomplete>,
}

impl AggregateAutocompleteResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

// ---------------------------------------------------------------------------
// View-model
// ---------------------------------------------------------------------------

/// Latest loading flag combined with the latest response, as rendered by the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewModel {
    pub loading: bool,
    pub autocomplete_response: AggregateAutocompleteResponse,
    /// Last lookup failure, cleared by the next successful result.
    /// Always `None` under [`FailurePolicy::Stall`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What the pipeline does with the view-model when the current lookup fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Leave `loading` set and keep the previous response. No error is surfaced.
    Stall,
    /// Clear `loading`, keep the previous response, surface the error.
    #[default]
    Reset,
    /// Clear `loading`, replace the response with an empty one, surface the error.
    Clear,
}

impl FailurePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stall" => Some(Self::Stall),
            "reset" => Some(Self::Reset),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

pub const DEFAULT_API_URL: &str = "https://orgbook.gov.bc.ca/api/v4";

/// Quiet interval before a typed query is looked up.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Runtime configuration. Loaded from `.orgbook.toml`, env and CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteConfig {
    /// Registry API base URL, without a trailing slash.
    pub api_url: String,
    pub debounce_ms: u64,
    pub request_timeout_ms: u64,
    pub failure_policy: FailurePolicy,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl AutocompleteConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

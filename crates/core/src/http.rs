//! Registry HTTP backend for the aggregate autocomplete endpoint.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::service::AutocompleteBackend;
use crate::types::{AggregateAutocompleteResponse, AutocompleteConfig};

const AUTOCOMPLETE_PATH: &str = "search/autocomplete";

pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(config: &AutocompleteConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self { client, endpoint: autocomplete_endpoint(&config.api_url)? })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Join the API base URL and the autocomplete path.
fn autocomplete_endpoint(api_url: &str) -> Result<String> {
    let base = api_url.trim().trim_end_matches('/');
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(SearchError::Config(format!("api_url must be an http(s) URL, got '{api_url}'")));
    }
    Ok(format!("{base}/{AUTOCOMPLETE_PATH}"))
}

#[async_trait]
impl AutocompleteBackend for HttpBackend {
    async fn aggregate_autocomplete(&self, query: &str) -> Result<AggregateAutocompleteResponse> {
        debug!(query, endpoint = %self.endpoint, "GET aggregate autocomplete");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("inactive", "false"), ("revoked", "false")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

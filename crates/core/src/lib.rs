//! OrgBook autocomplete: registry search box with debounced suggestions.
//!
//! # Modules
//!
//! - [`types`]: Registry response shapes, view-model, configuration
//! - [`error`]: Lookup and configuration errors
//! - [`service`]: Search service: action stream, active search, backend seam
//! - [`pipeline`]: Debounce / dedup / switch-latest state machine and its driver
//! - [`input`]: Search input component on top of the pipeline
//! - [`search`]: Direct (non-debounced) autocomplete list
//! - [`http`]: Registry HTTP backend (feature `http`)

pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod input;
pub mod pipeline;
pub mod search;
pub mod service;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub use error::{Result, SearchError};
use types::{AutocompleteConfig, FailurePolicy};

// ---------------------------------------------------------------------------
// Cross-platform path helpers
// ---------------------------------------------------------------------------

/// Platform-aware home directory: `HOME` on Unix, `USERPROFILE` on Windows.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok().map(PathBuf::from)
}

/// Platform-aware config directory: `~/.orgbook` on Unix, `%APPDATA%/orgbook` on Windows.
pub fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        std::env::var("APPDATA").ok().map(|a| PathBuf::from(a).join("orgbook"))
    } else {
        home_dir().map(|h| h.join(".orgbook"))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Known keys in `.orgbook.toml` / `config.toml`.
const KNOWN_CONFIG_KEYS: &[&str] =
    &["api_url", "debounce_ms", "request_timeout_ms", "failure_policy"];

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = ".orgbook.toml";

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Load configuration: defaults, then `~/.orgbook/config.toml`, then
/// `<project_root>/.orgbook.toml`, then `ORGBOOK_*` environment variables.
///
/// Missing or unparseable files are skipped; bad values are warned about and ignored.
pub fn load_config(project_root: &Path) -> AutocompleteConfig {
    let mut config = AutocompleteConfig::default();

    if let Some(dir) = config_dir() {
        apply_config_file(&mut config, &dir.join("config.toml"));
    }
    apply_config_file(&mut config, &project_root.join(PROJECT_CONFIG_FILE));
    apply_env(&mut config, |key| std::env::var(key).ok());

    config
}

fn apply_config_file(config: &mut AutocompleteConfig, path: &Path) {
    if !path.exists() {
        return;
    }
    debug!(path = %path.display(), "Loading config file");
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read config file");
            return;
        }
    };
    match content.parse::<toml::Table>() {
        Ok(table) => apply_config_table(config, &table, path),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to parse config file"),
    }
}

fn apply_config_table(config: &mut AutocompleteConfig, table: &toml::Table, path: &Path) {
    // Validate keys: warn on unknown
    for key in table.keys() {
        if KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            continue;
        }
        let suggestion = KNOWN_CONFIG_KEYS.iter().min_by_key(|k| edit_distance(key, k));
        match suggestion {
            Some(suggestion) if edit_distance(key, suggestion) <= 3 => warn!(
                key = key.as_str(),
                suggestion = *suggestion,
                "Unknown key in {}: did you mean '{suggestion}'?",
                path.display()
            ),
            _ => warn!(
                key = key.as_str(),
                "Unknown key in {} (known keys: {})",
                path.display(),
                KNOWN_CONFIG_KEYS.join(", ")
            ),
        }
    }

    if let Some(url) = table.get("api_url").and_then(|v| v.as_str()) {
        config.api_url = url.trim_end_matches('/').to_string();
    }

    for (key, slot) in [
        ("debounce_ms", &mut config.debounce_ms),
        ("request_timeout_ms", &mut config.request_timeout_ms),
    ] {
        if let Some(value) = table.get(key) {
            match value.as_integer().and_then(|v| u64::try_from(v).ok()) {
                Some(ms) => *slot = ms,
                None => warn!(key, "Expected a non-negative integer, ignoring"),
            }
        }
    }

    if let Some(value) = table.get("failure_policy") {
        match value.as_str().and_then(FailurePolicy::parse) {
            Some(policy) => config.failure_policy = policy,
            None => warn!("failure_policy must be one of: stall, reset, clear"),
        }
    }
}

fn apply_env(config: &mut AutocompleteConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(url) = var("ORGBOOK_API_URL").filter(|u| !u.trim().is_empty()) {
        config.api_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(raw) = var("ORGBOOK_DEBOUNCE_MS") {
        match raw.trim().parse() {
            Ok(ms) => config.debounce_ms = ms,
            Err(_) => warn!(value = raw.as_str(), "ORGBOOK_DEBOUNCE_MS is not a number, ignoring"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_table(src: &str) -> AutocompleteConfig {
        let mut config = AutocompleteConfig::default();
        let table: toml::Table = src.parse().unwrap();
        apply_config_table(&mut config, &table, Path::new(PROJECT_CONFIG_FILE));
        config
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("api_url", "api_url"), 0);
        assert_eq!(edit_distance("api_ulr", "api_url"), 2);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn project_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            concat!(
                "api_url = \"http://localhost:8080/api/\"\n",
                "debounce_ms = 150\n",
                "failure_policy = \"clear\"\n",
            ),
        )
        .unwrap();

        let mut config = AutocompleteConfig::default();
        apply_config_file(&mut config, &dir.path().join(PROJECT_CONFIG_FILE));

        assert_eq!(config.api_url, "http://localhost:8080/api");
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.failure_policy, FailurePolicy::Clear);
        assert_eq!(config.request_timeout_ms, types::DEFAULT_REQUEST_TIMEOUT_MS);
    }

    #[test]
    fn missing_or_broken_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AutocompleteConfig::default();
        apply_config_file(&mut config, &dir.path().join("absent.toml"));
        assert_eq!(config, AutocompleteConfig::default());

        let broken = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&broken, "debounce_ms = [").unwrap();
        apply_config_file(&mut config, &broken);
        assert_eq!(config, AutocompleteConfig::default());
    }

    #[test]
    fn invalid_values_are_ignored() {
        let config = load_table(
            "debounce_ms = -5\nfailure_policy = \"retry\"\nrequest_timeout_ms = \"soon\"\n",
        );
        assert_eq!(config, AutocompleteConfig::default());
    }

    #[test]
    fn unknown_keys_do_not_abort_loading() {
        let config = load_table("debounce = 10\ndebounce_ms = 20\n");
        assert_eq!(config.debounce_ms, 20);
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("ORGBOOK_API_URL", "https://example.test/api/"),
            ("ORGBOOK_DEBOUNCE_MS", "75"),
        ]
        .into();
        let mut config = load_table("debounce_ms = 20\n");
        apply_env(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_url, "https://example.test/api");
        assert_eq!(config.debounce_ms, 75);
    }

    #[test]
    fn bad_env_debounce_is_ignored() {
        let mut config = AutocompleteConfig::default();
        apply_env(&mut config, |k| (k == "ORGBOOK_DEBOUNCE_MS").then(|| "fast".to_string()));
        assert_eq!(config.debounce_ms, types::DEFAULT_DEBOUNCE_MS);
    }
}

//! OrgBook CLI: registered BC corporation lookups from the terminal.
//!
//! `autocomplete` does a single direct lookup; `interactive` treats each stdin
//! line as the new contents of the search field and prints suggestions as the
//! debounced pipeline publishes them.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, error};

use orgbook_core::http::HttpBackend;
use orgbook_core::input::SearchInput;
use orgbook_core::load_config;
use orgbook_core::search::Search;
use orgbook_core::service::SearchService;
use orgbook_core::types::{AggregateAutocomplete, AutocompleteConfig, ViewModel};

/// OrgBook CLI: registered BC corporation search.
#[derive(Parser)]
#[command(name = "orgbook", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Registry API base URL (overrides config and ORGBOOK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory to look for .orgbook.toml in (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Quiet interval before a typed query is looked up
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up suggestions for a query once
    Autocomplete {
        /// Query text (trimmed before lookup)
        query: String,
    },
    /// Read the search field from stdin, one line per edit
    ///
    /// Lines starting with `:search NAME` run a full search; `:clear` clears it.
    /// At end of input, waits for the last lookup before exiting.
    Interactive,
}

fn resolve_config(cli: &Cli) -> AutocompleteConfig {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    let mut config = load_config(&root);
    if let Some(url) = &cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(ms) = cli.debounce_ms {
        config.debounce_ms = ms;
    }
    debug!(?config, "Resolved configuration");
    config
}

fn write_suggestions(
    out: &mut impl Write,
    results: &[AggregateAutocomplete],
) -> std::io::Result<()> {
    for r in results {
        let source = r.topic_source_id.as_deref().unwrap_or("");
        let kind = r.kind.as_deref().unwrap_or("");
        writeln!(out, "{:<60} {:<12} {}", r.value, source, kind)?;
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

/// Suggestions and JSON go to `out`; status lines go to stderr.
fn write_view_model(out: &mut impl Write, vm: &ViewModel, json: bool) -> std::io::Result<()> {
    if json {
        return writeln!(out, "{}", to_json(vm));
    }
    if vm.loading {
        eprintln!("… loading");
        return Ok(());
    }
    if let Some(err) = &vm.error {
        eprintln!("lookup failed: {err}");
    }
    if vm.autocomplete_response.is_empty() {
        eprintln!("(no suggestions)");
    } else {
        write_suggestions(out, &vm.autocomplete_response.results)?;
        eprintln!("{} suggestions", vm.autocomplete_response.results.len());
    }
    out.flush()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("orgbook=warn".parse().expect("static directive")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli);

    let backend = match HttpBackend::new(&config) {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, "Could not create registry client");
            std::process::exit(2);
        }
    };
    let service = Arc::new(SearchService::new(Arc::new(backend)));

    let code = match cli.command {
        Commands::Autocomplete { query } => run_autocomplete(service, &query, cli.json).await,
        Commands::Interactive => {
            let input = SearchInput::new(service, &config);
            let stdin = BufReader::new(tokio::io::stdin());
            run_interactive(input, stdin, &mut std::io::stdout(), cli.json).await
        }
    };
    std::process::exit(code);
}

async fn run_autocomplete(service: Arc<SearchService>, query: &str, json: bool) -> i32 {
    let search = Search::new(service);
    let Some(lookup) = search.autocomplete(query) else {
        eprintln!("Query is empty");
        return 1;
    };
    if let Err(e) = lookup.await {
        error!(error = %e, "Lookup task failed");
        return 2;
    }

    let results = search.results();
    if json {
        println!("{}", to_json(&results));
    } else if results.is_empty() {
        eprintln!("No suggestions for '{query}'");
    } else {
        let _ = write_suggestions(&mut std::io::stdout(), &results);
        eprintln!("\n{} suggestions", results.len());
    }
    if results.is_empty() {
        1
    } else {
        0
    }
}

async fn run_interactive<R>(
    mut input: SearchInput,
    reader: R,
    out: &mut impl Write,
    json: bool,
) -> i32
where
    R: AsyncBufRead + Unpin,
{
    let mut view_model = input.subscribe();
    let mut active_search = input.service().subscribe_search_state();
    let mut lines = reader.lines();
    let mut reading = true;

    eprintln!("{}: {} (Ctrl-D to quit)", input.label(), input.placeholder());

    loop {
        tokio::select! {
            line = lines.next_line(), if reading => match line {
                Ok(Some(line)) => {
                    if let Some(name) = line.strip_prefix(":search ") {
                        input.set_search_value(name);
                        input.on_search(name);
                    } else if line.trim() == ":clear" {
                        input.on_clear_search();
                    } else {
                        input.set_search_value(line.as_str());
                        input.on_autocomplete(&line);
                    }
                }
                Ok(None) => {
                    debug!("End of input, waiting for pending lookups");
                    reading = false;
                }
                Err(e) => {
                    error!(error = %e, "Could not read stdin");
                    return 2;
                }
            },
            Ok(()) = view_model.changed() => {
                let vm = view_model.borrow_and_update().clone();
                if let Some(vm) = vm {
                    if let Err(e) = write_view_model(out, &vm, json) {
                        error!(error = %e, "Could not write suggestions");
                        return 2;
                    }
                }
            }
            Ok(()) = active_search.changed() => {
                match active_search.borrow_and_update().clone() {
                    Some(name) => eprintln!("searching for '{name}'"),
                    None => eprintln!("search cleared"),
                }
            }
            _ = input.settled(), if !reading => break,
        }
    }

    // The final publish can land in the same turn the pipeline goes idle.
    if view_model.has_changed().unwrap_or(false) {
        if let Some(vm) = view_model.borrow_and_update().clone() {
            if let Err(e) = write_view_model(out, &vm, json) {
                error!(error = %e, "Could not write suggestions");
                return 2;
            }
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use orgbook_core::service::AutocompleteBackend;
    use orgbook_core::types::AggregateAutocompleteResponse;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers every query with a single "<QUERY> LTD." suggestion after `latency`.
    #[derive(Default)]
    struct EchoBackend {
        latency: Duration,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AutocompleteBackend for EchoBackend {
        async fn aggregate_autocomplete(
            &self,
            query: &str,
        ) -> orgbook_core::Result<AggregateAutocompleteResponse> {
            self.calls.lock().unwrap().push(query.to_string());
            tokio::time::sleep(self.latency).await;
            Ok(AggregateAutocompleteResponse {
                total: 1,
                first_index: 1,
                last_index: 1,
                results: vec![AggregateAutocomplete {
                    value: format!("{} LTD.", query.to_uppercase()),
                    ..Default::default()
                }],
            })
        }
    }

    async fn run(backend: Arc<EchoBackend>, stdin: &'static [u8], json: bool) -> (i32, String) {
        let service = Arc::new(SearchService::new(backend));
        let input = SearchInput::new(service, &AutocompleteConfig::default());
        let mut out = Vec::new();
        let code = run_interactive(input, BufReader::new(stdin), &mut out, json).await;
        (code, String::from_utf8(out).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn last_line_before_eof_is_looked_up_and_printed() {
        let backend = Arc::new(EchoBackend::default());
        let (code, out) = run(backend.clone(), b"acme\n", false).await;

        assert_eq!(code, 0);
        assert!(out.contains("ACME LTD."), "output was: {out:?}");
        assert_eq!(*backend.calls.lock().unwrap(), vec!["acme"]);
    }

    #[tokio::test(start_paused = true)]
    async fn eof_waits_for_a_slow_lookup() {
        let backend =
            Arc::new(EchoBackend { latency: Duration::from_secs(2), ..Default::default() });
        let started = tokio::time::Instant::now();
        let (code, out) = run(backend, b"ac\nacme w\n", true).await;

        assert_eq!(code, 0);
        assert!(started.elapsed() >= Duration::from_millis(2_300));
        let last = out.lines().last().unwrap_or_default();
        let vm: serde_json::Value = serde_json::from_str(last).unwrap();
        assert_eq!(vm["loading"], false);
        assert_eq!(vm["autocomplete_response"]["results"][0]["value"], "ACME W LTD.");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_exits_without_output() {
        let (code, out) = run(Arc::new(EchoBackend::default()), b"", false).await;
        assert_eq!(code, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn debounce_flag_is_accepted_before_the_subcommand() {
        let cli = Cli::try_parse_from(["orgbook", "--debounce-ms", "50", "interactive"]).unwrap();
        assert_eq!(cli.debounce_ms, Some(50));
        let cli = Cli::try_parse_from(["orgbook", "interactive", "--debounce-ms", "75"]).unwrap();
        assert_eq!(cli.debounce_ms, Some(75));
        assert!(matches!(cli.command, Commands::Interactive));
    }
}

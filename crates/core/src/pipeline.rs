//! Debounced autocomplete pipeline.
//!
//! Raw queries from the service's action stream pass through four stages:
//! debounce, distinct-until-changed, dispatch (blank queries short-circuit to an
//! empty response), and switch-latest (only the newest request's result is
//! applied). [`PipelineState`] holds all of that as a pure state machine fed
//! with [`Event`]s. [`spawn_pipeline`] runs it on a tokio task that owns the
//! timer and the in-flight lookups.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::service::{AutocompleteBackend, SearchService};
use crate::types::{AggregateAutocompleteResponse, AutocompleteConfig, FailurePolicy, ViewModel};

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Input to [`PipelineState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A raw query arrived on the action stream.
    Query(String),
    /// The quiet interval armed by [`Effect::ArmDebounce`] with this `seq` ran out.
    DebounceElapsed { seq: u64 },
    /// The lookup dispatched with `token` finished.
    Completed { token: u64, result: Result<AggregateAutocompleteResponse, String> },
}

/// Work the driver must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// (Re)start the quiet timer. Any earlier timer is superseded.
    ArmDebounce { seq: u64 },
    /// Look up `query`; report back with [`Event::Completed`] carrying `token`.
    Dispatch { token: u64, query: String },
    Publish(ViewModel),
}

#[derive(Debug, Clone)]
pub struct PipelineState {
    policy: FailurePolicy,
    /// Sequence number of the newest debounce timer.
    debounce_seq: u64,
    /// Query waiting for its quiet interval to elapse.
    held: Option<String>,
    /// Last query that made it through debounce and dedup.
    last_passed: Option<String>,
    /// Token of the newest dispatch; completions with any other token are stale.
    token: u64,
    in_flight: bool,
    loading: bool,
    response: Option<AggregateAutocompleteResponse>,
    error: Option<String>,
}

impl PipelineState {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            debounce_seq: 0,
            held: None,
            last_passed: None,
            token: 0,
            in_flight: false,
            loading: false,
            response: None,
            error: None,
        }
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn current_token(&self) -> u64 {
        self.token
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Combined view, or `None` until the first response has been applied.
    pub fn view_model(&self) -> Option<ViewModel> {
        self.response.as_ref().map(|response| ViewModel {
            loading: self.loading,
            autocomplete_response: response.clone(),
            error: self.error.clone(),
        })
    }

    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Query(query) => {
                self.debounce_seq += 1;
                self.held = Some(query);
                vec![Effect::ArmDebounce { seq: self.debounce_seq }]
            }
            Event::DebounceElapsed { seq } => self.on_debounced(seq),
            Event::Completed { token, result } => self.on_completed(token, result),
        }
    }

    fn on_debounced(&mut self, seq: u64) -> Vec<Effect> {
        if seq != self.debounce_seq {
            return Vec::new();
        }
        let Some(query) = self.held.take() else {
            return Vec::new();
        };
        if self.last_passed.as_deref() == Some(query.as_str()) {
            debug!(query = %query, "Suppressed repeated query");
            return Vec::new();
        }
        self.last_passed = Some(query.clone());

        self.token += 1;
        self.loading = true;
        let mut effects = Vec::with_capacity(2);
        effects.extend(self.publish());

        if query.trim().is_empty() {
            // Nothing to look up; the empty result is available immediately.
            self.in_flight = false;
            self.loading = false;
            self.response = Some(AggregateAutocompleteResponse::empty());
            self.error = None;
            effects.extend(self.publish());
        } else {
            debug!(query = %query, token = self.token, "Dispatching autocomplete lookup");
            self.in_flight = true;
            effects.push(Effect::Dispatch { token: self.token, query });
        }
        effects
    }

    fn on_completed(
        &mut self,
        token: u64,
        result: Result<AggregateAutocompleteResponse, String>,
    ) -> Vec<Effect> {
        if token != self.token || !self.in_flight {
            debug!(token, current = self.token, "Discarded superseded lookup result");
            return Vec::new();
        }
        self.in_flight = false;

        match result {
            Ok(response) => {
                self.loading = false;
                self.response = Some(response);
                self.error = None;
            }
            Err(error) => {
                warn!(token, error = %error, policy = ?self.policy, "Autocomplete lookup failed");
                match self.policy {
                    FailurePolicy::Stall => return Vec::new(),
                    FailurePolicy::Reset => {
                        self.loading = false;
                        if self.response.is_none() {
                            self.response = Some(AggregateAutocompleteResponse::empty());
                        }
                        self.error = Some(error);
                    }
                    FailurePolicy::Clear => {
                        self.loading = false;
                        self.response = Some(AggregateAutocompleteResponse::empty());
                        self.error = Some(error);
                    }
                }
            }
        }
        self.publish().into_iter().collect()
    }

    fn publish(&self) -> Option<Effect> {
        self.view_model().map(Effect::Publish)
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Driver progress, updated after every handled event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStatus {
    /// Queries taken off the action stream, counting ones skipped while lagging.
    /// Starts at the service's send count when the pipeline subscribed.
    pub received: u64,
    /// A query is waiting out the debounce or a lookup is outstanding.
    pub busy: bool,
}

/// Running pipeline. Dropping the handle stops the driver task.
pub struct PipelineHandle {
    view_model: watch::Receiver<Option<ViewModel>>,
    status: watch::Receiver<PipelineStatus>,
    task: JoinHandle<()>,
}

impl PipelineHandle {
    pub fn view_model(&self) -> Option<ViewModel> {
        self.view_model.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ViewModel>> {
        self.view_model.clone()
    }

    pub fn status(&self) -> PipelineStatus {
        *self.status.borrow()
    }

    /// Resolve once the driver has taken `sent` queries off the action stream
    /// and has nothing left to debounce or look up. Also resolves if the
    /// driver has stopped.
    pub async fn settled(&self, sent: u64) {
        let mut status = self.status.clone();
        let _ = status.wait_for(|s| s.received >= sent && !s.busy).await;
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start the pipeline on the current tokio runtime.
///
/// Subscribes to the action stream before returning, so every query pushed
/// after this call is seen by the pipeline.
pub fn spawn_pipeline(service: &SearchService, config: &AutocompleteConfig) -> PipelineHandle {
    // Read the count first: a query sent in between is received but not
    // counted, which only makes `received` run ahead.
    let baseline = service.actions_sent();
    let actions = service.autocomplete_search_action();
    let (vm_tx, vm_rx) = watch::channel(None);
    let (status_tx, status_rx) =
        watch::channel(PipelineStatus { received: baseline, busy: false });
    let task = tokio::spawn(run_pipeline(
        actions,
        service.backend(),
        config.debounce(),
        config.failure_policy,
        vm_tx,
        status_tx,
    ));
    PipelineHandle { view_model: vm_rx, status: status_rx, task }
}

type Completion = (u64, Result<AggregateAutocompleteResponse, String>);

async fn run_pipeline(
    mut actions: broadcast::Receiver<String>,
    backend: Arc<dyn AutocompleteBackend>,
    debounce: Duration,
    policy: FailurePolicy,
    vm_tx: watch::Sender<Option<ViewModel>>,
    status_tx: watch::Sender<PipelineStatus>,
) {
    let mut state = PipelineState::new(policy);
    let mut received = status_tx.borrow().received;
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let mut deadline: Option<(Instant, u64)> = None;

    loop {
        let wake = deadline.map(|(at, _)| at);
        let effects = tokio::select! {
            msg = actions.recv() => match msg {
                Ok(query) => {
                    received += 1;
                    state.apply(Event::Query(query))
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Autocomplete pipeline lagged behind the action stream");
                    received += skipped;
                    Vec::new()
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Action stream closed, stopping autocomplete pipeline");
                    break;
                }
            },
            _ = sleep_until(wake.unwrap_or_else(Instant::now)), if wake.is_some() => {
                let seq = deadline.take().map(|(_, seq)| seq).unwrap_or_default();
                state.apply(Event::DebounceElapsed { seq })
            }
            Some((token, result)) = done_rx.recv() => {
                state.apply(Event::Completed { token, result })
            }
        };

        for effect in effects {
            match effect {
                Effect::ArmDebounce { seq } => deadline = Some((Instant::now() + debounce, seq)),
                Effect::Dispatch { token, query } => {
                    let backend = Arc::clone(&backend);
                    let done_tx = done_tx.clone();
                    tokio::spawn(async move {
                        let result = backend
                            .aggregate_autocomplete(&query)
                            .await
                            .map_err(|e| e.to_string());
                        // The pipeline may be gone; the result is simply dropped then.
                        let _ = done_tx.send((token, result));
                    });
                }
                Effect::Publish(vm) => {
                    vm_tx.send_replace(Some(vm));
                }
            }
        }

        let next = PipelineStatus { received, busy: deadline.is_some() || state.in_flight() };
        status_tx.send_if_modified(|status| {
            let changed = *status != next;
            *status = next;
            changed
        });
    }
}

//! Root application component: search panel, quick lookup, status bar.

use dioxus::prelude::*;

use crate::search::{QuickLookup, SearchPanel};
use crate::state::*;
use crate::INITIAL_STATE;

static APP_CSS: Asset = asset!("/assets/styles/app.css");

#[component]
pub fn App() -> Element {
    // Taken once; every later render sees the same value, so the hook order below is stable.
    let initial = use_hook(|| INITIAL_STATE.lock().ok().and_then(|mut s| s.take()));
    let Some(state) = initial else {
        return rsx! {
            div { class: "suggestion-error", "Registry client was not initialised" }
        };
    };
    use_context_provider(|| state);

    rsx! {
        document::Stylesheet { href: APP_CSS }

        div {
            class: "app-shell",

            div {
                class: "titlebar",
                span { "OrgBook BC" }
            }

            div {
                class: "content-area",
                SearchPanel {}
                QuickLookup {}
            }

            StatusBar {}
        }
    }
}

/// Status bar at the bottom of the app
#[component]
fn StatusBar() -> Element {
    let state = use_context::<AppState>();
    let vm = VIEW_MODEL.read();
    let active = ACTIVE_SEARCH.read();

    let suggestions = vm.as_ref().map(|vm| vm.autocomplete_response.results.len()).unwrap_or(0);
    let loading = vm.as_ref().is_some_and(|vm| vm.loading);

    rsx! {
        div {
            class: "statusbar",
            span { "{state.config.api_url}" }
            span { "|" }
            if loading {
                span { "loading…" }
            } else {
                span { "{suggestions} suggestions" }
            }
            {active.as_ref().map(|name| rsx! {
                span { "|" }
                span { "searching: {name}" }
            })}
        }
    }
}

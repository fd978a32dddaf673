//! Search field backed by the core debounced autocomplete pipeline.

use dioxus::prelude::*;

use orgbook_core::input::SearchInput;

use super::suggestion_list::SuggestionList;
use crate::state::*;

#[component]
pub fn SearchField() -> Element {
    let state = use_context::<AppState>();
    let mut input = use_signal(|| SearchInput::new(state.service.clone(), &state.config));

    // Mirror the pipeline's view-model into the global signal.
    use_future(move || async move {
        let mut rx = input.read().subscribe();
        while rx.changed().await.is_ok() {
            let vm = rx.borrow_and_update().clone();
            *VIEW_MODEL.write() = vm;
        }
    });

    // Mirror the service's active search.
    let service = state.service.clone();
    use_future(move || {
        let mut rx = service.subscribe_search_state();
        async move {
            while rx.changed().await.is_ok() {
                let active = rx.borrow_and_update().clone();
                *ACTIVE_SEARCH.write() = active;
            }
        }
    });

    let query = QUERY.read();
    let has_query = !query.is_empty();
    let loading = VIEW_MODEL.read().as_ref().is_some_and(|vm| vm.loading);
    let field_label = input.read().label();
    let placeholder = input.read().placeholder();

    rsx! {
        div {
            class: if has_query { "search-field has-query" } else { "search-field" },

            label { class: "search-label", "{field_label}" }

            div {
                class: "search-input-row",

                input {
                    class: "search-input",
                    r#type: "text",
                    placeholder: "{placeholder}",
                    value: "{query}",
                    autofocus: true,
                    oninput: move |e: Event<FormData>| {
                        let value = e.value();
                        *QUERY.write() = value.clone();
                        input.write().set_search_value(value.as_str());
                        input.read().on_autocomplete(&value);
                    },
                    onkeydown: move |e: Event<KeyboardData>| {
                        if e.key() == Key::Enter {
                            let name = QUERY.read().clone();
                            input.read().on_search(&name);
                        }
                    },
                }

                if loading {
                    span { class: "search-loading", "searching…" }
                }

                if has_query {
                    button {
                        class: "search-clear",
                        onclick: move |_| {
                            *QUERY.write() = String::new();
                            input.write().on_clear_search();
                        },
                        "\u{00D7}"
                    }
                }
            }

            SuggestionList {
                on_select: move |name: String| {
                    *QUERY.write() = name.clone();
                    input.write().set_search_value(name.as_str());
                    input.read().on_search(&name);
                }
            }
        }
    }
}

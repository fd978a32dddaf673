//! Suggestions from the latest pipeline view-model.

use dioxus::prelude::*;

use crate::state::*;

#[component]
pub fn SuggestionList(on_select: EventHandler<String>) -> Element {
    let vm = VIEW_MODEL.read();
    let query = QUERY.read();

    let Some(vm) = vm.as_ref() else {
        return rsx! {};
    };
    if query.trim().is_empty() {
        return rsx! {};
    }

    rsx! {
        {vm.error.as_ref().map(|err| rsx! {
            div { class: "suggestion-error", "Lookup failed: {err}" }
        })}
        if vm.autocomplete_response.is_empty() && !vm.loading {
            div { class: "suggestion-empty", "No matching organizations" }
        }
        ul {
            class: "suggestion-list",
            for (i, item) in vm.autocomplete_response.results.iter().enumerate() {
                li {
                    key: "{i}",
                    class: "suggestion-item",
                    onclick: {
                        let value = item.value.clone();
                        move |_| on_select.call(value.clone())
                    },
                    span { class: "suggestion-value", "{item.value}" }
                    span {
                        class: "suggestion-source",
                        {item.topic_source_id.clone().unwrap_or_default()}
                    }
                }
            }
        }
    }
}

//! Quick lookup: direct, non-debounced autocomplete on submit.

use dioxus::prelude::*;

use orgbook_core::search::Search;

use crate::state::*;

#[component]
pub fn QuickLookup() -> Element {
    let state = use_context::<AppState>();
    let search = use_signal(|| Search::new(state.service.clone()));
    let mut draft = use_signal(String::new);

    use_future(move || async move {
        let mut rx = search.read().subscribe();
        while rx.changed().await.is_ok() {
            let results = rx.borrow_and_update().results.clone();
            *QUICK_RESULTS.write() = results;
        }
    });

    let results = QUICK_RESULTS.read();

    rsx! {
        div {
            class: "quick-lookup",
            label { class: "search-label", "Quick lookup" }
            div {
                class: "search-input-row",
                input {
                    class: "search-input",
                    r#type: "text",
                    placeholder: "Press Enter to look up a name",
                    value: "{draft}",
                    oninput: move |e: Event<FormData>| draft.set(e.value()),
                    onkeydown: move |e: Event<KeyboardData>| {
                        if e.key() == Key::Enter {
                            // Results arrive through the list channel.
                            let _ = search.read().autocomplete(&draft.read());
                        }
                    },
                }
            }
            ul {
                class: "suggestion-list",
                for (i, item) in results.iter().enumerate() {
                    li {
                        key: "{i}",
                        class: "suggestion-item",
                        span { class: "suggestion-value", "{item.value}" }
                    }
                }
            }
        }
    }
}

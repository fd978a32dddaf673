//! Search panel: debounced search field + suggestion list, and the quick lookup panel.

mod quick_lookup;
mod search_input;
mod suggestion_list;

use dioxus::prelude::*;
pub use quick_lookup::QuickLookup;
use search_input::SearchField;

/// Search panel spanning the full width of the content area.
#[component]
pub fn SearchPanel() -> Element {
    rsx! {
        div {
            class: "search-panel",
            SearchField {}
        }
    }
}

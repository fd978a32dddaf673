//! OrgBook Desktop: Dioxus-powered registered BC corporation search.

use std::sync::{Arc, Mutex};

use dioxus::prelude::*;
use tracing::error;

use orgbook_core::http::HttpBackend;
use orgbook_core::service::SearchService;

mod app;
mod search;
mod state;

use app::App;
use state::AppState;

/// Pre-runtime storage: built before Dioxus launches, consumed on first render.
pub static INITIAL_STATE: Mutex<Option<AppState>> = Mutex::new(None);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("orgbook=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cwd = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    let config = orgbook_core::load_config(&cwd);
    let backend = match HttpBackend::new(&config) {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, "Could not create registry client");
            std::process::exit(2);
        }
    };
    let service = Arc::new(SearchService::new(Arc::new(backend)));
    *INITIAL_STATE.lock().unwrap() = Some(AppState { service, config });

    #[cfg(feature = "desktop")]
    {
        use dioxus::desktop::{Config, LogicalSize, WindowBuilder};

        LaunchBuilder::new()
            .with_cfg(
                Config::default()
                    .with_menu(None)
                    .with_background_color((250, 250, 250, 255))
                    .with_window(
                        WindowBuilder::new()
                            .with_title("OrgBook Search")
                            .with_inner_size(LogicalSize::new(900.0, 700.0))
                            .with_min_inner_size(LogicalSize::new(480.0, 400.0))
                            .with_resizable(true),
                    ),
            )
            .launch(App);
    }

    #[cfg(not(feature = "desktop"))]
    {
        dioxus::launch(App);
    }
}

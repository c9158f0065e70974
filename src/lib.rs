//! Six degrees of football: connect two players through shared teammates.
//!
//! `engine` holds the DOM-free game logic, `api` talks to the relationship
//! service, and the Leptos client-side app lives in `components` and `pages`.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod text;
mod components;
mod pages;

// Top-Level pages
use crate::pages::explore::Explore;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;
use crate::pages::timed::TimeTrialPage;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Router for the challenge, time trial, free exploration and 404 pages. Wakes the
/// service on first render.
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	let config = config::GameConfig::load();
	let warm = api::GraphApi::new(config.api_base_url.clone());
	spawn_local(async move { api::warm_on_render(&warm).await });
	provide_context(config);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		<Title text="Six Degrees" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/explore") view=Explore />
				<Route path=path!("/timed") view=TimeTrialPage />
			</Routes>
		</Router>
	}
}

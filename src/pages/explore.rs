use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use log::{info, warn};

use crate::api::GraphApi;
use crate::components::force_graph::ForceGraphCanvas;
use crate::components::{Board, GameHeader, NeighborsPanel};
use crate::config::GameConfig;
use crate::engine::{NeighborEntry, NodeId};
use crate::text::{matches, normalize_text};

const MAX_SUGGESTIONS: usize = 20;

/// Catalog entries whose name contains `query`, ignoring accents and case, in
/// catalog order. An empty query matches nothing.
fn matching_players(catalog: &[NeighborEntry], query: &str, limit: usize) -> Vec<NeighborEntry> {
	let needle = normalize_text(query);
	if needle.is_empty() {
		return Vec::new();
	}
	catalog
		.iter()
		.filter(|entry| matches(&entry.name, &needle))
		.take(limit)
		.cloned()
		.collect()
}

/// Free exploration: start anywhere, no target, no step budget.
#[component]
pub fn Explore() -> impl IntoView {
	let config = use_context::<GameConfig>().unwrap_or_default().exploration();
	let api = GraphApi::new(config.api_base_url.clone());
	let board = Board::new(api.clone(), &config);
	let catalog = RwSignal::new(None::<Result<Vec<NeighborEntry>, String>>);
	let query = RwSignal::new(String::new());

	spawn_local(async move {
		let outcome = api.player_list().await.map_err(|err| {
			warn!("could not load the player list: {err}");
			err.to_string()
		});
		if let Ok(players) = &outcome {
			info!("loaded {} players", players.len());
		}
		catalog.set(Some(outcome));
	});

	let pick = move |entry: NeighborEntry| {
		query.set(String::new());
		board.start(entry, None);
	};
	let on_select = Callback::new(move |node_id: NodeId| board.select(&node_id));
	let start_over = Callback::new(move |()| board.reset());

	let suggestions = move || {
		let found = catalog.with(|catalog| match catalog {
			Some(Ok(players)) => Ok(query.with(|q| matching_players(players, q, MAX_SUGGESTIONS))),
			Some(Err(reason)) => Err(Some(reason.clone())),
			None => Err(None),
		});
		match found {
			Ok(players) => players
				.into_iter()
				.map(|entry| {
					let name = entry.name.clone();
					view! {
						<li>
							<button on:click=move |_| pick(entry.clone())>{name}</button>
						</li>
					}
				})
				.collect_view()
				.into_any(),
			Err(Some(reason)) => {
				view! { <li class="error" title=reason>"Player list unavailable."</li> }.into_any()
			}
			Err(None) => view! { <li>"Loading players…"</li> }.into_any(),
		}
	};

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas data=board.graph config=config on_select=on_select fullscreen=true />
			<div class="graph-overlay">
				<GameHeader status=board.status again_label="Start over" on_again=start_over />
				<div class="player-search">
					<input
						type="search"
						placeholder="Start from a player"
						aria-label="Start from a player"
						prop:value=move || query.get()
						on:input=move |ev| query.set(event_target_value(&ev))
					/>
					<ul class="suggestions">{suggestions}</ul>
				</div>
				<nav>
					<button on:click=move |_| start_over.run(())>"Clear board"</button>
					<A href="/">"Challenge mode"</A>
					<A href="/timed">"Time trial"</A>
				</nav>
			</div>
			<NeighborsPanel board=board />
		</div>
	}
}

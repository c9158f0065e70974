use leptos::prelude::*;

use super::board::{Board, PanelView};
use crate::engine::NeighborEntry;
use crate::text::{compare_names, matches, normalize_text};

/// Neighbors of `view.focus` matching `query`, sorted by name ignoring
/// accents and case.
fn visible_neighbors(view: &PanelView, query: &str) -> Vec<NeighborEntry> {
	let needle = normalize_text(query);
	let mut shown: Vec<NeighborEntry> = view
		.neighbors
		.iter()
		.flatten()
		.filter(|entry| matches(&entry.name, &needle))
		.cloned()
		.collect();
	shown.sort_by(|a, b| compare_names(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
	shown
}

#[component]
pub fn NeighborsPanel(board: Board) -> impl IntoView {
	let panel = board.panel_view;
	let query = RwSignal::new(String::new());

	let focus_id = Memo::new(move |_| panel.with(|p| p.focus.as_ref().map(|f| f.id.clone())));

	// A new focus starts with an empty search.
	Effect::new(move |_| {
		focus_id.track();
		query.set(String::new());
	});

	let body = move || {
		let snapshot = panel.get();
		if let Some(error) = snapshot.error.clone() {
			return view! {
				<div class="panel-message error" title=error>
					<p>"Unable to load neighbors. Please try again later."</p>
					<button on:click=move |_| board.retry_panel()>"Retry"</button>
				</div>
			}
			.into_any();
		}
		if snapshot.neighbors.is_none() {
			let text = if snapshot.loading { "Loading neighbors…" } else { "" };
			return view! { <p class="panel-message">{text}</p> }.into_any();
		}

		let shown = visible_neighbors(&snapshot, &query.get());
		if shown.is_empty() {
			return view! { <p class="panel-message">"No matching neighbors found."</p> }.into_any();
		}
		let items = shown
			.into_iter()
			.map(|entry| {
				let placed = snapshot.is_on_board(&entry.id);
				let disabled = placed || !snapshot.interactive;
				let name = entry.name.clone();
				view! {
					<li>
						<button
							class="neighbor"
							class:placed=placed
							disabled=disabled
							on:click=move |_| board.connect(entry.clone())
						>
							{name}
						</button>
					</li>
				}
			})
			.collect_view();
		view! { <ul class="neighbor-list">{items}</ul> }.into_any()
	};

	view! {
		<Show when=move || focus_id.with(Option::is_some)>
			<aside class="neighbors-panel">
				<header>
					<h2>{move || panel.with(|p| p.focus.as_ref().map(|f| f.name.clone()))}</h2>
					<button class="close" aria-label="Close panel" on:click=move |_| board.close_panel()>
						"×"
					</button>
				</header>
				<input
					type="search"
					placeholder="Search neighbors"
					aria-label="Search neighbors"
					prop:value=move || query.get()
					on:input=move |ev| query.set(event_target_value(&ev))
				/>
				<div class="panel-body">{body}</div>
			</aside>
		</Show>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::Focus;

	fn view() -> PanelView {
		PanelView {
			focus: Some(Focus {
				id: "p1".into(),
				name: "Alice".into(),
			}),
			neighbors: Some(vec![
				NeighborEntry::new("p3", "Carol"),
				NeighborEntry::new("p2", "bob"),
				NeighborEntry::new("p4", "Bobby"),
			]),
			..PanelView::default()
		}
	}

	#[test]
	fn search_is_case_insensitive_and_sorted() {
		let names: Vec<_> = visible_neighbors(&view(), " BOB ")
			.into_iter()
			.map(|entry| entry.name)
			.collect();
		assert_eq!(names, ["bob", "Bobby"]);
	}

	#[test]
	fn search_ignores_accents_and_sorts_by_letter() {
		let view = PanelView {
			neighbors: Some(vec![
				NeighborEntry::new("p1", "zed"),
				NeighborEntry::new("p2", "Mesut Özil"),
				NeighborEntry::new("p3", "Adam"),
				NeighborEntry::new("p4", "Zlatan"),
			]),
			..PanelView::default()
		};
		let names: Vec<_> = visible_neighbors(&view, "")
			.into_iter()
			.map(|entry| entry.name)
			.collect();
		assert_eq!(names, ["Adam", "Mesut Özil", "zed", "Zlatan"]);

		let found = visible_neighbors(&view, "ozil");
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].id, "p2");
	}

	#[test]
	fn empty_query_shows_everything() {
		assert_eq!(visible_neighbors(&view(), "").len(), 3);
		assert!(visible_neighbors(&PanelView::default(), "").is_empty());
	}
}

//! Reactive face of one game.
//!
//! The engine objects are single-threaded and live in local stored values.
//! After every change they are projected into plain snapshots held in
//! signals, which is all the views ever read.

use std::rc::Rc;

use leptos::prelude::*;
use log::info;

use super::browser::{BrowserSpawner, BrowserTimer};
use super::force_graph::GraphData;
use crate::api::GraphApi;
use crate::config::GameConfig;
use crate::engine::{
	Focus, GameController, GameResult, NeighborEntry, NeighborFetchCoordinator, NeighborPanel,
	NodeId,
};

/// Snapshot of the neighbors panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelView {
	pub focus: Option<Focus>,
	pub neighbors: Option<Vec<NeighborEntry>>,
	/// Fetch running or debounce pending for the focused node.
	pub loading: bool,
	pub error: Option<String>,
	pub on_board: Vec<NodeId>,
	pub interactive: bool,
}

impl PanelView {
	pub fn is_on_board(&self, node_id: &str) -> bool {
		self.on_board.iter().any(|id| id == node_id)
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameStatus {
	pub source: Option<NeighborEntry>,
	pub target: Option<NeighborEntry>,
	pub steps: usize,
	pub max_steps: Option<usize>,
	pub result: Option<GameResult>,
}

#[derive(Clone, Copy)]
pub struct Board {
	game: StoredValue<GameController, LocalStorage>,
	panel: StoredValue<NeighborPanel<BrowserTimer>, LocalStorage>,
	endpoints: RwSignal<(Option<NeighborEntry>, Option<NeighborEntry>)>,
	round: RwSignal<u64>,
	locked: RwSignal<bool>,
	on_finish: StoredValue<Option<Callback<GameResult>>>,
	pub graph: RwSignal<GraphData>,
	pub panel_view: RwSignal<PanelView>,
	pub status: RwSignal<GameStatus>,
}

impl Board {
	pub fn new(api: GraphApi, config: &GameConfig) -> Self {
		let coordinator = NeighborFetchCoordinator::new(Rc::new(api));
		let game = GameController::new(coordinator.clone(), config.max_steps);
		let panel = NeighborPanel::new(
			coordinator,
			BrowserTimer,
			Rc::new(BrowserSpawner),
			config.debounce_ms,
		);
		let board = Self {
			game: StoredValue::new_local(game),
			panel: StoredValue::new_local(panel.clone()),
			endpoints: RwSignal::new((None, None)),
			round: RwSignal::new(0),
			locked: RwSignal::new(false),
			on_finish: StoredValue::new(None),
			graph: RwSignal::new(GraphData::default()),
			panel_view: RwSignal::new(PanelView::default()),
			status: RwSignal::new(GameStatus::default()),
		};
		panel.set_on_change(move || board.sync());
		board
	}

	/// Called once per game, right after the connect that decided it.
	pub fn on_finish(&self, callback: Callback<GameResult>) {
		self.on_finish.set_value(Some(callback));
	}

	/// Freeze the board: no selections or connects until unlocked.
	pub fn set_locked(&self, locked: bool) {
		self.locked.try_set(locked);
		if locked {
			self.close_panel();
		}
		self.sync();
	}

	fn is_locked(&self) -> bool {
		self.locked.try_get_untracked().unwrap_or(true)
	}

	/// Root a new game at `source`. Without a target the board is free
	/// exploration.
	pub fn start(&self, source: NeighborEntry, target: Option<NeighborEntry>) {
		let Some(panel) = self.panel.try_get_value() else {
			return;
		};
		self.round.try_update(|round| *round += 1);
		panel.reset();
		let target_id = target.as_ref().map(|t| t.id.as_str());
		panel.set_target(target_id);
		let _ = self
			.game
			.try_update_value(|game| game.start(&source.id, &source.name, target_id));
		panel.prefetch(&source.id);
		self.endpoints.try_set((Some(source), target));
		self.sync();
	}

	/// Open the panel on a node already on the board.
	pub fn select(&self, node_id: &str) {
		if self.is_locked() {
			return;
		}
		let label = self.game.try_with_value(|game| {
			if game.is_complete() {
				return None;
			}
			game.nodes()
				.iter()
				.find(|node| node.id == node_id)
				.map(|node| node.label.clone())
		});
		let (Some(Some(label)), Some(panel)) = (label, self.panel.try_get_value()) else {
			return;
		};
		panel.open(node_id, &label);
	}

	/// Place `entry` next to the focused node and move focus to it.
	pub fn connect(&self, entry: NeighborEntry) {
		if self.is_locked() {
			return;
		}
		let Some(panel) = self.panel.try_get_value() else {
			return;
		};
		let Some(parent) = panel.focus() else {
			return;
		};
		let outcome = self.game.try_update_value(|game| {
			let placed = game.connect(&parent.id, &entry.id, &entry.name);
			(placed, game.result())
		});
		let finished = match outcome {
			Some((true, Some(result))) => {
				info!("{result:?} reaching {}", entry.name);
				panel.close();
				Some(result)
			}
			Some((true, None)) => {
				panel.open(&entry.id, &entry.name);
				None
			}
			_ => None,
		};
		self.sync();
		if let (Some(result), Some(Some(callback))) = (finished, self.on_finish.try_get_value()) {
			callback.run(result);
		}
	}

	pub fn close_panel(&self) {
		if let Some(panel) = self.panel.try_get_value() {
			panel.close();
		}
	}

	pub fn retry_panel(&self) {
		if let Some(panel) = self.panel.try_get_value() {
			panel.refresh();
		}
	}

	pub fn reset(&self) {
		if let Some(panel) = self.panel.try_get_value() {
			panel.reset();
		}
		let _ = self.game.try_update_value(|game| game.new_challenge());
		self.endpoints.try_set((None, None));
		self.round.try_update(|round| *round += 1);
		self.sync();
	}

	fn sync(&self) {
		let Some(panel) = self.panel.try_get_value() else {
			return;
		};
		let focus = panel.focus();
		let round = self.round.try_get_untracked().unwrap_or_default();
		let locked = self.is_locked();
		let Some((graph, on_board, mut status)) = self.game.try_with_value(|game| {
			let graph = GraphData {
				round,
				nodes: game.nodes().to_vec(),
				links: game.links().to_vec(),
				source_id: game.source_id().map(str::to_string),
				target_id: game.target_id().map(str::to_string),
				loading: game.neighbors().loading_ids(),
				active_id: focus.as_ref().map(|f| f.id.clone()),
				interactive: !game.is_complete() && !locked,
			};
			let on_board = game.nodes().iter().map(|node| node.id.clone()).collect();
			let status = GameStatus {
				steps: game.steps(),
				max_steps: game.max_steps(),
				result: game.result(),
				..GameStatus::default()
			};
			(graph, on_board, status)
		}) else {
			return;
		};

		if let Some((source, target)) = self.endpoints.try_get_untracked() {
			status.source = source;
			status.target = target;
		}
		let panel_view = PanelView {
			neighbors: panel.neighbors().map(|list| list.to_vec()),
			loading: panel.is_loading() || panel.has_pending_debounce(),
			error: panel
				.error()
				.filter(|err| !err.is_aborted())
				.map(|err| err.to_string()),
			on_board,
			interactive: graph.interactive,
			focus,
		};

		self.graph.try_set(graph);
		self.panel_view.try_set(panel_view);
		self.status.try_set(status);
	}
}

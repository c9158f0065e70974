//! Canonical board state for one game.
//!
//! The board is a tree grown one node at a time from already placed nodes.
//! Misuse never errors; operations report through their return value or leave
//! the state untouched.

use std::collections::HashSet;

use log::{debug, info};

use super::neighbors::NeighborFetchCoordinator;
use super::types::{GameResult, GraphLink, GraphNode, NodeId};

/// Board, result and step budget of the current game.
pub struct GameController {
	neighbors: NeighborFetchCoordinator,
	max_steps: Option<usize>,
	nodes: Vec<GraphNode>,
	node_ids: HashSet<NodeId>,
	links: Vec<GraphLink>,
	link_keys: HashSet<String>,
	target_id: Option<NodeId>,
	result: Option<GameResult>,
}

impl GameController {
	/// An empty board. A zero budget counts as no budget.
	pub fn new(neighbors: NeighborFetchCoordinator, max_steps: Option<usize>) -> Self {
		Self {
			neighbors,
			max_steps: max_steps.filter(|&budget| budget > 0),
			nodes: Vec::new(),
			node_ids: HashSet::new(),
			links: Vec::new(),
			link_keys: HashSet::new(),
			target_id: None,
			result: None,
		}
	}

	/// Begin a game rooted at the source player. Without a target the game is
	/// free exploration and can never be decided.
	pub fn start(&mut self, source_id: &str, source_label: &str, target_id: Option<&str>) {
		self.reset();
		if source_id.is_empty() {
			return;
		}
		let label = if source_label.trim().is_empty() {
			"Unknown"
		} else {
			source_label
		};
		self.target_id = target_id.filter(|id| !id.is_empty()).map(str::to_string);
		self.insert_node(GraphNode {
			id: source_id.to_string(),
			label: label.to_string(),
			parent_id: None,
		});
		info!(
			"game started at {source_id}, target {:?}, budget {:?}",
			self.target_id, self.max_steps
		);
	}

	/// Place `child_id` next to the already placed `parent_id`.
	///
	/// Returns `false` without touching the board when the game is decided,
	/// the child is blank or already placed, or the parent is not on the board.
	pub fn connect(&mut self, parent_id: &str, child_id: &str, child_label: &str) -> bool {
		if self.result.is_some() || child_id.is_empty() || child_label.is_empty() {
			return false;
		}
		if self.node_ids.contains(child_id) || !self.node_ids.contains(parent_id) {
			return false;
		}

		self.insert_node(GraphNode {
			id: child_id.to_string(),
			label: child_label.to_string(),
			parent_id: Some(parent_id.to_string()),
		});
		self.insert_link(GraphLink::new(parent_id, child_id));
		debug!("connected {parent_id} -> {child_id}, steps {}", self.steps());

		self.evaluate_progress(child_id);
		true
	}

	fn evaluate_progress(&mut self, added_id: &str) {
		let Some(target) = self.target_id.as_deref() else {
			return;
		};
		let outcome = if added_id == target {
			Some(GameResult::Win)
		} else {
			self.max_steps
				.filter(|&budget| self.steps() >= budget)
				.map(|_| GameResult::Lose)
		};
		if let Some(outcome) = outcome {
			self.finalize(outcome);
		}
	}

	fn finalize(&mut self, outcome: GameResult) {
		if self.result.is_none() {
			info!("game decided: {outcome:?} after {} steps", self.steps());
			self.result = Some(outcome);
		}
	}

	fn insert_node(&mut self, node: GraphNode) {
		if self.node_ids.insert(node.id.clone()) {
			self.nodes.push(node);
		}
	}

	fn insert_link(&mut self, link: GraphLink) {
		if self.link_keys.insert(link.key()) {
			self.links.push(link);
		}
	}

	/// Clear the board and every cached neighbor list.
	pub fn reset(&mut self) {
		self.nodes.clear();
		self.node_ids.clear();
		self.links.clear();
		self.link_keys.clear();
		self.target_id = None;
		self.result = None;
		self.neighbors.invalidate(None);
	}

	/// Throw the board away before a new pair is loaded.
	pub fn new_challenge(&mut self) {
		debug!("new challenge requested");
		self.reset();
	}

	/// Placed players in placement order; the source comes first.
	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	/// One link per placed player besides the source.
	pub fn links(&self) -> &[GraphLink] {
		&self.links
	}

	/// Whether `node_id` is on the board.
	pub fn contains(&self, node_id: &str) -> bool {
		self.node_ids.contains(node_id)
	}

	/// Players placed after the source.
	pub fn steps(&self) -> usize {
		self.nodes.len().saturating_sub(1)
	}

	/// Step budget, if any.
	pub fn max_steps(&self) -> Option<usize> {
		self.max_steps
	}

	/// Outcome once decided.
	pub fn result(&self) -> Option<GameResult> {
		self.result
	}

	/// Won or lost.
	pub fn is_complete(&self) -> bool {
		self.result.is_some()
	}

	/// Root of the board.
	pub fn source_id(&self) -> Option<&str> {
		self.nodes.first().map(|node| node.id.as_str())
	}

	/// Player that wins the game when placed.
	pub fn target_id(&self) -> Option<&str> {
		self.target_id.as_deref()
	}

	/// Coordinator invalidated on reset.
	pub fn neighbors(&self) -> &NeighborFetchCoordinator {
		&self.neighbors
	}
}

#[cfg(test)]
mod tests {
	use std::rc::Rc;

	use super::*;
	use crate::engine::neighbors::tests::MockSource;
	use crate::engine::types::NeighborEntry;

	fn game(budget: Option<usize>) -> (Rc<MockSource>, GameController) {
		let source = Rc::new(MockSource::default());
		let coordinator = NeighborFetchCoordinator::new(source.clone());
		(source, GameController::new(coordinator, budget))
	}

	#[test]
	fn scenario_a_reaching_the_target_wins() {
		let (_, mut game) = game(Some(6));
		game.start("p1", "Alice", Some("p5"));
		assert!(game.connect("p1", "p2", "Bob"));
		assert!(game.connect("p2", "p3", "Carol"));
		assert!(game.connect("p3", "p5", "Eve"));

		assert_eq!(game.result(), Some(GameResult::Win));
		assert_eq!(game.steps(), 3);
	}

	#[test]
	fn scenario_b_exhausting_the_budget_loses() {
		let (_, mut game) = game(Some(2));
		game.start("p1", "Alice", Some("p99"));
		assert!(game.connect("p1", "p2", "Bob"));
		assert_eq!(game.result(), None);
		assert!(game.connect("p2", "p3", "Carol"));

		assert_eq!(game.steps(), 2);
		assert_eq!(game.result(), Some(GameResult::Lose));
	}

	#[test]
	fn scenario_d_duplicate_connect_is_a_no_op() {
		let (_, mut game) = game(Some(6));
		game.start("p1", "Alice", Some("p5"));
		assert!(game.connect("p1", "p2", "Bob"));
		assert!(!game.connect("p1", "p2", "Bob"));

		assert_eq!(game.nodes().len(), 2);
		assert_eq!(game.links(), &[GraphLink::new("p1", "p2")]);
	}

	#[test]
	fn result_is_decided_once() {
		let (_, mut game) = game(Some(1));
		game.start("p1", "Alice", Some("p3"));
		assert!(game.connect("p1", "p2", "Bob"));
		assert_eq!(game.result(), Some(GameResult::Lose));

		// The target would now win, but the game is already over.
		assert!(!game.connect("p2", "p3", "Carol"));
		assert_eq!(game.result(), Some(GameResult::Lose));
		assert_eq!(game.steps(), 1);
	}

	#[test]
	fn target_on_the_last_budgeted_step_wins() {
		let (_, mut game) = game(Some(2));
		game.start("p1", "Alice", Some("p3"));
		game.connect("p1", "p2", "Bob");
		game.connect("p2", "p3", "Carol");
		assert_eq!(game.result(), Some(GameResult::Win));
	}

	#[test]
	fn steps_grow_by_one_per_successful_connect() {
		let (_, mut game) = game(None);
		game.start("p1", "Alice", None);
		let attempts = [
			("p1", "p2", "Bob", true),
			("p1", "p2", "Bob", false),
			("p2", "", "Nobody", false),
			("p2", "p3", "", false),
			("p9", "p4", "Dan", false),
			("p2", "p3", "Carol", true),
			("p1", "p4", "Dan", true),
		];

		let mut last = game.steps();
		for (parent, child, label, expected) in attempts {
			let added = game.connect(parent, child, label);
			assert_eq!(added, expected, "connect({parent}, {child})");
			let steps = game.steps();
			assert_eq!(steps, last + usize::from(added));
			last = steps;
		}
		assert_eq!(last, 3);
	}

	#[test]
	fn free_exploration_is_never_decided() {
		let (_, mut game) = game(Some(2));
		game.start("p1", "Alice", None);
		for (parent, child) in [("p1", "p2"), ("p2", "p3"), ("p3", "p4"), ("p4", "p5")] {
			assert!(game.connect(parent, child, "Someone"));
		}
		assert_eq!(game.result(), None);
		assert_eq!(game.steps(), 4);
	}

	#[test]
	fn board_is_a_tree_rooted_at_the_source() {
		let (_, mut game) = game(None);
		game.start("p1", "", Some("p9"));
		game.connect("p1", "p2", "Bob");
		game.connect("p1", "p3", "Carol");
		game.connect("p3", "p4", "Dan");

		let root = &game.nodes()[0];
		assert_eq!(root.label, "Unknown");
		assert_eq!(root.parent_id, None);
		assert_eq!(game.source_id(), Some("p1"));
		for node in &game.nodes()[1..] {
			let parent = node.parent_id.as_deref().unwrap();
			assert!(game.contains(parent));
			assert!(game.links().contains(&GraphLink::new(parent, node.id.as_str())));
		}
		assert_eq!(game.links().len(), game.nodes().len() - 1);
	}

	#[test]
	fn connect_before_start_is_rejected() {
		let (_, mut game) = game(Some(6));
		assert!(!game.connect("p1", "p2", "Bob"));
		assert!(game.nodes().is_empty());
	}

	#[tokio::test]
	async fn new_challenge_clears_board_and_cache() {
		let (source, mut game) = game(Some(6));
		source.reply("p1", Ok(vec![NeighborEntry::new("p2", "Bob")]));
		game.start("p1", "Alice", Some("p2"));
		game.neighbors().request("p1", None).await.unwrap();
		game.connect("p1", "p2", "Bob");
		assert!(game.is_complete());

		game.new_challenge();
		assert!(game.nodes().is_empty());
		assert!(game.links().is_empty());
		assert_eq!(game.result(), None);
		assert_eq!(game.target_id(), None);
		assert!(game.neighbors().cached("p1").is_none());

		game.start("p1", "Alice", Some("p2"));
		game.neighbors().request("p1", None).await.unwrap();
		assert_eq!(source.call_count("p1"), 2);
	}
}

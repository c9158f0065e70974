use std::rc::Rc;

/// Identifier of a player in the relationship graph.
pub type NodeId = String;

/// A player placed on the board. `parent_id` is `None` only for the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphNode {
	/// Player id.
	pub id: NodeId,
	/// Display name.
	pub label: String,
	/// Node this player was reached from.
	pub parent_id: Option<NodeId>,
}

/// Edge from the node a player was reached from to the player itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GraphLink {
	/// Parent end.
	pub source: NodeId,
	/// Child end.
	pub target: NodeId,
}

impl GraphLink {
	/// Link from `source` to `target`.
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}

	/// De-duplication key, `source-target`.
	pub fn key(&self) -> String {
		format!("{}-{}", self.source, self.target)
	}
}

/// One `(id, display name)` pair from a neighbor lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighborEntry {
	/// Player id.
	pub id: NodeId,
	/// Display name.
	pub name: String,
}

impl NeighborEntry {
	/// Entry for player `id` called `name`.
	pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
		}
	}
}

/// Immutable, cheaply shared neighbor list as handed out by the cache.
pub type Neighbors = Rc<[NeighborEntry]>;

/// Terminal outcome of a bounded game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
	/// The target was placed.
	Win,
	/// The step budget ran out first.
	Lose,
}

/// Point in graph coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Position {
	/// Point at `(x, y)`.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// False if either coordinate is NaN or infinite.
	pub fn is_finite(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

/// Size of the drawing surface in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
}

impl CanvasSize {
	/// Surface of `width` by `height` pixels.
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Middle of the surface.
	pub fn center(&self) -> Position {
		Position::new(self.width / 2.0, self.height / 2.0)
	}
}

impl Default for CanvasSize {
	fn default() -> Self {
		Self::new(720.0, 540.0)
	}
}

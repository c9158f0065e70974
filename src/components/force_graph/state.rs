use crate::config::GameConfig;
use crate::engine::{
	CanvasSize, ForceLayout, GraphNode, NodeId, Position, TransitionDone, ViewportController,
};

use super::types::GraphData;

pub const NODE_RADIUS: f64 = 72.0;
/// Pointer travel (screen px) below which a press counts as a click.
const CLICK_SLOP: f64 = 4.0;
const ZOOM_STEP: f64 = 1.1;

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub last_x: f64,
	pub last_y: f64,
	pub travelled: f64,
}

pub struct ForceGraphState {
	pub data: GraphData,
	pub layout: ForceLayout,
	pub camera: ViewportController,
	pub pan: PanState,
	pub hover: Option<NodeId>,
	recenter_ms: f64,
}

impl ForceGraphState {
	pub fn new(config: &GameConfig, canvas: CanvasSize) -> Self {
		Self {
			data: GraphData::default(),
			layout: ForceLayout::new(config.layout.clone()),
			camera: ViewportController::new(config.viewport.clone(), canvas),
			pan: PanState::default(),
			hover: None,
			recenter_ms: config.recenter_duration_ms,
		}
	}

	pub fn canvas(&self) -> CanvasSize {
		self.camera.canvas()
	}

	/// Take a new snapshot. Only a change in nodes or links re-runs the layout
	/// and snaps the camera; role or loading changes just redraw.
	pub fn set_data(&mut self, data: GraphData) {
		let new_round = self.data.round != data.round;
		let reshaped = new_round || !self.data.same_shape(&data);
		self.data = data;
		if new_round {
			self.layout.reset();
			self.camera.reset();
		}
		if !self.data.interactive {
			self.pan = PanState::default();
			self.hover = None;
		}
		if reshaped {
			self.relayout();
		}
	}

	pub fn resize(&mut self, canvas: CanvasSize) {
		if canvas == self.camera.canvas() {
			return;
		}
		self.camera.resize(canvas);
		self.relayout();
	}

	fn relayout(&mut self) {
		if self.data.nodes.is_empty() {
			self.layout.reset();
			self.camera.reset();
			return;
		}
		let canvas = self.camera.canvas();
		let positions = self.layout.update(&self.data.nodes, &self.data.links, canvas);
		self.camera.fit(positions.values());
	}

	pub fn position(&self, node_id: &str) -> Option<Position> {
		self.layout.position(node_id)
	}

	/// Topmost node under the screen point, if any.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<&GraphNode> {
		let (gx, gy) = self.camera.current().screen_to_graph(sx, sy);
		self.data.nodes.iter().rev().find(|node| {
			self.position(&node.id)
				.is_some_and(|p| (p.x - gx).hypot(p.y - gy) <= NODE_RADIUS)
		})
	}

	/// Returns whether the hovered node changed.
	pub fn set_hover(&mut self, sx: f64, sy: f64) -> bool {
		let hovered = if self.data.interactive {
			self.node_at_position(sx, sy).map(|node| node.id.clone())
		} else {
			None
		};
		let changed = hovered != self.hover;
		self.hover = hovered;
		changed
	}

	pub fn press(&mut self, sx: f64, sy: f64) {
		if !self.data.interactive {
			return;
		}
		self.pan = PanState {
			active: true,
			last_x: sx,
			last_y: sy,
			travelled: 0.0,
		};
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		let (dx, dy) = (sx - self.pan.last_x, sy - self.pan.last_y);
		self.pan.travelled += dx.hypot(dy);
		self.pan.last_x = sx;
		self.pan.last_y = sy;
		self.camera.pan_by(dx, dy);
	}

	/// End a press. Yields the clicked node when the pointer barely moved.
	pub fn release(&mut self, sx: f64, sy: f64) -> Option<NodeId> {
		let pan = std::mem::take(&mut self.pan);
		if !pan.active || pan.travelled >= CLICK_SLOP {
			return None;
		}
		self.node_at_position(sx, sy).map(|node| node.id.clone())
	}

	pub fn cancel_press(&mut self) {
		self.pan = PanState::default();
		self.hover = None;
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if !self.data.interactive {
			return;
		}
		let factor = if delta_y > 0.0 { 1.0 / ZOOM_STEP } else { ZOOM_STEP };
		self.camera.zoom_at(sx, sy, factor);
	}

	pub fn recenter(&mut self) -> TransitionDone {
		self.camera.recenter(self.recenter_ms)
	}

	pub fn show_recenter(&self) -> bool {
		self.data.interactive && self.camera.show_recenter()
	}

	pub fn tick(&mut self, dt_ms: f64) {
		self.camera.tick(dt_ms);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::{GraphLink, Viewport};

	fn node(id: &str, parent: Option<&str>) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: id.to_uppercase(),
			parent_id: parent.map(Into::into),
		}
	}

	fn board() -> GraphData {
		GraphData {
			nodes: vec![node("a", None), node("b", Some("a")), node("c", Some("a"))],
			links: vec![GraphLink::new("a", "b"), GraphLink::new("a", "c")],
			source_id: Some("a".into()),
			target_id: Some("z".into()),
			interactive: true,
			..GraphData::default()
		}
	}

	fn state() -> ForceGraphState {
		let mut state = ForceGraphState::new(&GameConfig::default(), CanvasSize::new(800.0, 600.0));
		state.set_data(board());
		state
	}

	fn screen_of(state: &ForceGraphState, id: &str) -> (f64, f64) {
		let p = state.position(id).unwrap();
		let vp = state.camera.current();
		(p.x * vp.zoom + vp.x, p.y * vp.zoom + vp.y)
	}

	#[test]
	fn new_board_is_laid_out_and_centered() {
		let state = state();
		assert_eq!(state.layout.positions().len(), 3);
		assert_eq!(state.camera.current(), state.camera.baseline());
		assert_eq!(state.camera.current().zoom, 1.0);
		assert!(!state.show_recenter());
	}

	#[test]
	fn click_selects_node_and_drag_pans() {
		let mut state = state();
		let (x, y) = screen_of(&state, "b");
		state.press(x, y);
		assert_eq!(state.release(x + 1.0, y).as_deref(), Some("b"));

		state.press(x, y);
		state.drag_to(x + 30.0, y + 40.0);
		assert_eq!(state.release(x + 30.0, y + 40.0), None);
		let moved = state.camera.current();
		assert_eq!(moved.x, state.camera.baseline().x + 30.0);
		assert!(state.show_recenter());
	}

	#[test]
	fn new_round_discards_the_previous_camera() {
		let mut state = state();
		let (x, y) = screen_of(&state, "b");
		state.press(x, y);
		state.drag_to(x + 50.0, y);
		state.release(x + 50.0, y);
		assert!(state.show_recenter());

		state.set_data(GraphData {
			round: 1,
			..board()
		});
		assert!(!state.show_recenter());
		assert_eq!(state.camera.current(), state.camera.baseline());
		assert_eq!(state.layout.positions().len(), 3);
	}

	#[test]
	fn loading_markers_do_not_move_the_camera() {
		let mut state = state();
		state.press(0.0, 0.0);
		state.drag_to(50.0, 0.0);
		state.release(50.0, 0.0);
		let panned = state.camera.current();

		let mut marked = board();
		marked.loading = vec!["b".into()];
		marked.active_id = Some("b".into());
		state.set_data(marked);
		assert_eq!(state.camera.current(), panned);
		assert!(state.show_recenter());
	}

	#[test]
	fn growing_board_refits() {
		let mut state = state();
		state.press(0.0, 0.0);
		state.drag_to(50.0, 0.0);
		state.release(50.0, 0.0);

		let mut grown = board();
		grown.nodes.push(node("d", Some("b")));
		grown.links.push(GraphLink::new("b", "d"));
		state.set_data(grown);
		assert_eq!(state.camera.current(), state.camera.baseline());
		assert!(!state.show_recenter());
		assert!(state.position("d").is_some());
	}

	#[test]
	fn finished_game_ignores_gestures() {
		let mut state = state();
		let mut done = board();
		done.interactive = false;
		state.set_data(done);
		let (x, y) = screen_of(&state, "b");
		state.press(x, y);
		assert_eq!(state.release(x, y), None);
		state.wheel(x, y, -1.0);
		assert_eq!(state.camera.current(), state.camera.baseline());
		assert!(!state.set_hover(x, y));
	}

	#[test]
	fn empty_board_resets_camera() {
		let mut state = state();
		state.set_data(GraphData::default());
		assert!(state.layout.positions().is_empty());
		assert_eq!(state.camera.current(), Viewport::IDENTITY);
		assert!(state.node_at_position(400.0, 300.0).is_none());
	}

	#[test]
	fn resize_recenters_on_new_canvas() {
		let mut state = state();
		state.resize(CanvasSize::new(1200.0, 900.0));
		assert_eq!(state.canvas(), CanvasSize::new(1200.0, 900.0));
		assert_eq!(state.camera.current(), state.camera.baseline());
	}
}

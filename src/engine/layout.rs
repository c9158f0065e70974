//! Bounded force layout for the growing board.
//!
//! Every change re-runs a short, non-animated simulation over all nodes. Nodes
//! keep their previous position as the seed, new nodes start on top of their
//! parent, so the picture grows instead of reshuffling. The forces follow the
//! usual velocity-Verlet scheme: link springs, centering, many-body repulsion
//! and collision, with alpha cooling and velocity decay.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::types::{CanvasSize, GraphLink, GraphNode, NodeId, Position};
use crate::config::LayoutConfig;

const ALPHA_MIN: f64 = 0.001;
const VELOCITY_DECAY: f64 = 0.4;
const DISTANCE_MIN_SQ: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default)]
struct Body {
	x: f64,
	y: f64,
	vx: f64,
	vy: f64,
}

/// Positions of the board, kept between updates so the graph grows in place.
pub struct ForceLayout {
	config: LayoutConfig,
	positions: HashMap<NodeId, Position>,
}

impl ForceLayout {
	/// An empty layout.
	pub fn new(config: LayoutConfig) -> Self {
		Self {
			config,
			positions: HashMap::new(),
		}
	}

	/// Every known position, by node.
	pub fn positions(&self) -> &HashMap<NodeId, Position> {
		&self.positions
	}

	/// Last computed position of `node_id`.
	pub fn position(&self, node_id: &str) -> Option<Position> {
		self.positions.get(node_id).copied()
	}

	/// Forget every position.
	pub fn reset(&mut self) {
		self.positions.clear();
	}

	/// Ticks spent on a board of `node_count` nodes; larger boards get fewer.
	pub fn tick_budget(&self, node_count: usize) -> usize {
		if node_count <= 1 {
			return 0;
		}
		self.config
			.base_ticks
			.saturating_sub(self.config.ticks_per_node * node_count)
			.max(1)
	}

	/// Starting point for each node: last known position, else the parent's,
	/// else the canvas center.
	pub fn seed(&self, node: &GraphNode, canvas: CanvasSize) -> Position {
		if let Some(known) = self.positions.get(&node.id) {
			return *known;
		}
		node.parent_id
			.as_ref()
			.and_then(|parent| self.positions.get(parent))
			.copied()
			.unwrap_or_else(|| canvas.center())
	}

	/// Lay out `nodes` and remember the result as the new last known set.
	pub fn update(
		&mut self,
		nodes: &[GraphNode],
		links: &[GraphLink],
		canvas: CanvasSize,
	) -> &HashMap<NodeId, Position> {
		if nodes.is_empty() {
			self.positions.clear();
			return &self.positions;
		}

		let index: HashMap<&str, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.as_str(), i))
			.collect();
		let mut bodies: Vec<Body> = nodes
			.iter()
			.map(|node| {
				let seed = self.seed(node, canvas);
				Body {
					x: seed.x,
					y: seed.y,
					..Body::default()
				}
			})
			.collect();
		let edges: Vec<(usize, usize)> = normalize_links(nodes, links)
			.iter()
			.filter_map(|link| {
				Some((
					*index.get(link.source.as_str())?,
					*index.get(link.target.as_str())?,
				))
			})
			.collect();

		let ticks = self.tick_budget(nodes.len());
		let mut sim = Simulation::new(&self.config, &edges, bodies.len(), canvas.center());
		for _ in 0..ticks {
			sim.tick(&mut bodies, &edges);
		}
		debug!("laid out {} nodes in {ticks} ticks", nodes.len());

		let center = canvas.center();
		self.positions = nodes
			.iter()
			.zip(&bodies)
			.map(|(node, body)| {
				let position = Position::new(body.x, body.y);
				let position = if position.is_finite() { position } else { center };
				(node.id.clone(), position)
			})
			.collect();
		&self.positions
	}
}

/// Explicit links first, then one per non-root node, de-duplicated by key.
pub fn normalize_links(nodes: &[GraphNode], links: &[GraphLink]) -> Vec<GraphLink> {
	let mut seen = HashSet::new();
	let derived = nodes.iter().filter_map(|node| {
		node.parent_id
			.as_ref()
			.map(|parent| GraphLink::new(parent.as_str(), node.id.as_str()))
	});
	links
		.iter()
		.cloned()
		.chain(derived)
		.filter(|link| !link.source.is_empty() && !link.target.is_empty())
		.filter(|link| seen.insert(link.key()))
		.collect()
}

struct Simulation<'a> {
	config: &'a LayoutConfig,
	center: Position,
	alpha: f64,
	alpha_decay: f64,
	bias: Vec<f64>,
	jiggle_state: u64,
}

impl<'a> Simulation<'a> {
	fn new(
		config: &'a LayoutConfig,
		edges: &[(usize, usize)],
		body_count: usize,
		center: Position,
	) -> Self {
		let mut degree = vec![0usize; body_count];
		for &(s, t) in edges {
			degree[s] += 1;
			degree[t] += 1;
		}
		let bias = edges
			.iter()
			.map(|&(s, t)| degree[s] as f64 / (degree[s] + degree[t]) as f64)
			.collect();
		Self {
			config,
			center,
			alpha: 1.0,
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
			bias,
			jiggle_state: 0x9e37_79b9_7f4a_7c15,
		}
	}

	/// Tiny deterministic nudge used to separate coincident nodes.
	fn jiggle(&mut self) -> f64 {
		self.jiggle_state = self
			.jiggle_state
			.wrapping_mul(6_364_136_223_846_793_005)
			.wrapping_add(1_442_695_040_888_963_407);
		let unit = (self.jiggle_state >> 11) as f64 / (1u64 << 53) as f64;
		(unit - 0.5) * 1e-6
	}

	fn tick(&mut self, bodies: &mut [Body], edges: &[(usize, usize)]) {
		self.alpha += (0.0 - self.alpha) * self.alpha_decay;

		self.apply_links(bodies, edges);
		self.apply_center(bodies);
		self.apply_charge(bodies);
		self.apply_collision(bodies);

		for body in bodies.iter_mut() {
			body.vx *= 1.0 - VELOCITY_DECAY;
			body.vy *= 1.0 - VELOCITY_DECAY;
			body.x += body.vx;
			body.y += body.vy;
		}
	}

	fn apply_links(&mut self, bodies: &mut [Body], edges: &[(usize, usize)]) {
		let (distance, strength) = (self.config.link_distance, self.config.link_strength);
		for (i, &(s, t)) in edges.iter().enumerate() {
			let (source, target) = (bodies[s], bodies[t]);
			let mut x = target.x + target.vx - source.x - source.vx;
			let mut y = target.y + target.vy - source.y - source.vy;
			if x == 0.0 {
				x = self.jiggle();
			}
			if y == 0.0 {
				y = self.jiggle();
			}
			let len = (x * x + y * y).sqrt();
			let l = (len - distance) / len * self.alpha * strength;
			let (x, y, b) = (x * l, y * l, self.bias[i]);
			bodies[t].vx -= x * b;
			bodies[t].vy -= y * b;
			bodies[s].vx += x * (1.0 - b);
			bodies[s].vy += y * (1.0 - b);
		}
	}

	fn apply_center(&self, bodies: &mut [Body]) {
		let n = bodies.len() as f64;
		let (sx, sy) = bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let (dx, dy) = (self.center.x - sx / n, self.center.y - sy / n);
		for body in bodies.iter_mut() {
			body.x += dx;
			body.y += dy;
		}
	}

	fn apply_charge(&mut self, bodies: &mut [Body]) {
		let strength = self.config.charge_strength * self.alpha;
		for i in 0..bodies.len() {
			for j in 0..bodies.len() {
				if i == j {
					continue;
				}
				let mut x = bodies[j].x - bodies[i].x;
				let mut y = bodies[j].y - bodies[i].y;
				if x == 0.0 {
					x = self.jiggle();
				}
				if y == 0.0 {
					y = self.jiggle();
				}
				let mut l = x * x + y * y;
				if l < DISTANCE_MIN_SQ {
					l = (DISTANCE_MIN_SQ * l).sqrt();
				}
				let w = strength / l;
				bodies[i].vx += x * w;
				bodies[i].vy += y * w;
			}
		}
	}

	fn apply_collision(&mut self, bodies: &mut [Body]) {
		let radius = self.config.collision_radius;
		let reach = radius * 2.0;
		// Equal radii split every correction evenly.
		let share = 0.5;
		for i in 0..bodies.len() {
			let xi = bodies[i].x + bodies[i].vx;
			let yi = bodies[i].y + bodies[i].vy;
			for j in (i + 1)..bodies.len() {
				let mut x = xi - bodies[j].x - bodies[j].vx;
				let mut y = yi - bodies[j].y - bodies[j].vy;
				let mut l = x * x + y * y;
				if l >= reach * reach {
					continue;
				}
				if x == 0.0 {
					x = self.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.jiggle();
					l += y * y;
				}
				let len = l.sqrt();
				let l = (reach - len) / len;
				x *= l;
				y *= l;
				bodies[i].vx += x * share;
				bodies[i].vy += y * share;
				bodies[j].vx -= x * share;
				bodies[j].vy -= y * share;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, parent: Option<&str>) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: id.to_uppercase(),
			parent_id: parent.map(Into::into),
		}
	}

	fn distance(a: Position, b: Position) -> f64 {
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	fn canvas() -> CanvasSize {
		CanvasSize::new(800.0, 600.0)
	}

	#[test]
	fn tick_budget_shrinks_with_the_board() {
		let layout = ForceLayout::new(LayoutConfig::default());
		assert_eq!(layout.tick_budget(1), 0);
		assert_eq!(layout.tick_budget(2), 36);
		assert_eq!(layout.tick_budget(10), 20);
		assert_eq!(layout.tick_budget(19), 2);
		assert_eq!(layout.tick_budget(20), 1);
		assert_eq!(layout.tick_budget(500), 1);
	}

	#[test]
	fn lone_root_sits_at_canvas_center() {
		let mut layout = ForceLayout::new(LayoutConfig::default());
		let positions = layout.update(&[node("p1", None)], &[], canvas());
		assert_eq!(positions["p1"], Position::new(400.0, 300.0));
	}

	#[test]
	fn seeds_prefer_last_known_then_parent_then_center() {
		let mut layout = ForceLayout::new(LayoutConfig::default());
		layout.update(&[node("p1", None), node("p2", Some("p1"))], &[], canvas());
		let p2 = layout.position("p2").unwrap();

		assert_eq!(layout.seed(&node("p2", Some("p1")), canvas()), p2);
		assert_eq!(layout.seed(&node("p3", Some("p2")), canvas()), p2);
		assert_eq!(
			layout.seed(&node("p4", Some("missing")), canvas()),
			canvas().center()
		);
	}

	#[test]
	fn connected_nodes_are_pushed_apart() {
		let mut layout = ForceLayout::new(LayoutConfig::default());
		let nodes = [node("p1", None), node("p2", Some("p1"))];
		let positions = layout.update(&nodes, &[], canvas());

		let gap = distance(positions["p1"], positions["p2"]);
		assert!(gap > 100.0, "gap {gap}");
		let mid_x = (positions["p1"].x + positions["p2"].x) / 2.0;
		let mid_y = (positions["p1"].y + positions["p2"].y) / 2.0;
		assert!((mid_x - 400.0).abs() < 1.0 && (mid_y - 300.0).abs() < 1.0);
	}

	#[test]
	fn star_does_not_overlap() {
		let mut layout = ForceLayout::new(LayoutConfig::default());
		let mut nodes = vec![node("hub", None)];
		for i in 0..5 {
			nodes.push(node(&format!("leaf{i}"), Some("hub")));
			layout.update(&nodes, &[], canvas());
		}

		let positions: Vec<Position> = layout.positions().values().copied().collect();
		assert_eq!(positions.len(), 6);
		for (i, a) in positions.iter().enumerate() {
			assert!(a.is_finite());
			for b in &positions[i + 1..] {
				assert!(distance(*a, *b) > 80.0, "{a:?} vs {b:?}");
			}
		}
	}

	#[test]
	fn layout_is_deterministic() {
		let nodes = [
			node("p1", None),
			node("p2", Some("p1")),
			node("p3", Some("p1")),
			node("p4", Some("p3")),
		];
		let mut a = ForceLayout::new(LayoutConfig::default());
		let mut b = ForceLayout::new(LayoutConfig::default());
		assert_eq!(a.update(&nodes, &[], canvas()), b.update(&nodes, &[], canvas()));
	}

	#[test]
	fn links_merge_explicit_and_parent_derived() {
		let nodes = [node("p1", None), node("p2", Some("p1")), node("p3", Some("p2"))];
		let explicit = [
			GraphLink::new("p1", "p2"),
			GraphLink::new("p1", "p3"),
			GraphLink::new("p1", "p3"),
			GraphLink::new("", "p3"),
		];
		let links = normalize_links(&nodes, &explicit);
		assert_eq!(
			links,
			vec![
				GraphLink::new("p1", "p2"),
				GraphLink::new("p1", "p3"),
				GraphLink::new("p2", "p3"),
			]
		);
	}

	#[test]
	fn empty_board_and_reset_forget_positions() {
		let mut layout = ForceLayout::new(LayoutConfig::default());
		layout.update(&[node("p1", None)], &[], canvas());
		assert!(layout.update(&[], &[], canvas()).is_empty());

		layout.update(&[node("p1", None)], &[], canvas());
		layout.reset();
		assert!(layout.positions().is_empty());
	}
}

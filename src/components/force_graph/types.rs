use crate::engine::{GraphLink, GraphNode, NodeId};

/// What the canvas draws: the board plus the roles of its special nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// Bumped for every new game; a change discards old positions and camera.
	pub round: u64,
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
	pub source_id: Option<NodeId>,
	pub target_id: Option<NodeId>,
	/// Nodes whose neighbors are being fetched.
	pub loading: Vec<NodeId>,
	/// Node the neighbors panel is open on.
	pub active_id: Option<NodeId>,
	/// False once the game is decided; clicks and gestures are ignored.
	pub interactive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRole {
	Source,
	Target,
	Player,
}

impl GraphData {
	pub fn role(&self, node_id: &str) -> NodeRole {
		if self.source_id.as_deref() == Some(node_id) {
			NodeRole::Source
		} else if self.target_id.as_deref() == Some(node_id) {
			NodeRole::Target
		} else {
			NodeRole::Player
		}
	}

	pub fn is_loading(&self, node_id: &str) -> bool {
		self.loading.iter().any(|id| id == node_id)
	}

	/// Same nodes and links, ignoring roles and loading markers.
	pub fn same_shape(&self, other: &GraphData) -> bool {
		self.nodes == other.nodes && self.links == other.links
	}
}

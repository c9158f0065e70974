//! Graph exploration engine: board state, neighbor fetching, layout and camera.
//!
//! Nothing in here touches the DOM; the browser glue lives in `components`.

mod game;
mod layout;
mod neighbors;
mod panel;
mod trial;
mod types;
mod viewport;

pub use game::GameController;
pub use layout::{ForceLayout, normalize_links};
pub use neighbors::{NeighborFetchCoordinator, NeighborRequest, NeighborResult, NeighborSource};
pub use panel::{DebounceTimer, Focus, NeighborPanel};
pub use trial::TimeTrial;
pub use types::{
	CanvasSize, GameResult, GraphLink, GraphNode, NeighborEntry, Neighbors, NodeId, Position,
};
pub use viewport::{TransitionDone, TransitionOutcome, Viewport, ViewportController};

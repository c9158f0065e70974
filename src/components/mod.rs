mod board;
mod browser;
pub mod force_graph;
mod neighbors_panel;
mod status;

pub use board::Board;
pub use neighbors_panel::NeighborsPanel;
pub use status::GameHeader;

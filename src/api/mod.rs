//! Access to the relationship-graph service.

mod client;
mod payload;
mod warmup;

pub use client::GraphApi;
pub use payload::{
	Endpoints, parse_endpoints, parse_neighbors, parse_player_list, response_is_pong,
};
pub use warmup::{ping_for_play, pick_in_range, warm_on_render};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::payload::{self, Endpoints};
use crate::engine::{NeighborEntry, NeighborSource};
use crate::error::FetchError;

/// HTTP client for the relationship-graph service.
///
/// Every route is the base URL with a `path` query parameter, plus `key` for
/// per-player lookups.
#[derive(Clone, Debug)]
pub struct GraphApi {
	client: Client,
	base_url: String,
}

impl GraphApi {
	/// Client for the service rooted at `base_url`.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			client: Client::new(),
			base_url: base_url.into(),
		}
	}

	/// Base URL every route is appended to.
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// A fresh random challenge.
	pub async fn endpoints(&self) -> Result<Endpoints, FetchError> {
		let body = self.get_text(&[("path", "endpoints")]).await?;
		payload::parse_endpoints(&body)
	}

	/// Teammates of `node_id`. An empty id yields an empty list without a request.
	pub async fn neighbors(&self, node_id: &str) -> Result<Vec<NeighborEntry>, FetchError> {
		if node_id.is_empty() {
			return Ok(Vec::new());
		}
		let body = self
			.get_text(&[("path", "neighbors"), ("key", node_id)])
			.await?;
		payload::parse_neighbors(&body)
	}

	/// Every known player, sorted by name.
	pub async fn player_list(&self) -> Result<Vec<NeighborEntry>, FetchError> {
		let body = self.get_text(&[("path", "playerlist")]).await?;
		payload::parse_player_list(&body)
	}

	/// Raw body of the health endpoint.
	pub async fn ping(&self) -> Result<String, FetchError> {
		self.get_text(&[("path", "ping")]).await
	}

	async fn get_text(&self, query: &[(&str, &str)]) -> Result<String, FetchError> {
		debug!("GET {} {:?}", self.base_url, query);
		let response = self
			.client
			.get(&self.base_url)
			.query(query)
			.send()
			.await?
			.error_for_status()?;
		Ok(response.text().await?)
	}
}

#[async_trait(?Send)]
impl NeighborSource for GraphApi {
	async fn fetch_neighbors(&self, node_id: &str) -> Result<Vec<NeighborEntry>, FetchError> {
		self.neighbors(node_id).await
	}
}

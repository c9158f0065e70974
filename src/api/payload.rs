//! Validation of the service's JSON bodies.
//!
//! Bodies are untrusted: entries of the wrong shape are dropped rather than
//! failing the whole response.

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::NeighborEntry;
use crate::error::FetchError;
use crate::text::compare_names;

/// Source and target of a challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
	/// Where the player starts.
	pub source: NeighborEntry,
	/// Who the player has to reach.
	pub target: NeighborEntry,
}

#[derive(Deserialize)]
struct EndpointsPayload {
	source: (String, String),
	target: (String, String),
}

/// `{ "source": [id, name], "target": [id, name] }`.
pub fn parse_endpoints(body: &str) -> Result<Endpoints, FetchError> {
	let payload: EndpointsPayload = serde_json::from_str(body)?;
	let (source, target) = (payload.source, payload.target);
	if source.0.is_empty() || target.0.is_empty() {
		return Err(FetchError::Decode("endpoint with empty id".into()));
	}
	Ok(Endpoints {
		source: NeighborEntry::new(source.0, source.1),
		target: NeighborEntry::new(target.0, target.1),
	})
}

/// `{ "neighbors": [[id, name], ...] }`; anything else yields an empty list.
pub fn parse_neighbors(body: &str) -> Result<Vec<NeighborEntry>, FetchError> {
	let payload: Value = serde_json::from_str(body)?;
	let Some(Value::Array(entries)) = payload.get("neighbors") else {
		return Ok(Vec::new());
	};

	let valid: Vec<NeighborEntry> = entries.iter().filter_map(pair_entry).collect();
	if valid.len() < entries.len() {
		warn!(
			"dropped {} malformed neighbor entries",
			entries.len() - valid.len()
		);
	}
	Ok(valid)
}

fn pair_entry(entry: &Value) -> Option<NeighborEntry> {
	match entry.as_array()?.as_slice() {
		[Value::String(id), Value::String(name), ..] if !id.is_empty() => {
			Some(NeighborEntry::new(id.as_str(), name.as_str()))
		}
		_ => None,
	}
}

/// `{ id: name, ... }`, sorted by name for display.
pub fn parse_player_list(body: &str) -> Result<Vec<NeighborEntry>, FetchError> {
	let payload: Value = serde_json::from_str(body)?;
	let Value::Object(players) = payload else {
		return Err(FetchError::Decode("player list is not an object".into()));
	};

	let mut catalog: Vec<NeighborEntry> = players
		.iter()
		.filter(|(id, _)| !id.is_empty())
		.filter_map(|(id, name)| Some(NeighborEntry::new(id.as_str(), name.as_str()?)))
		.collect();
	if catalog.len() < players.len() {
		warn!("dropped {} malformed players", players.len() - catalog.len());
	}
	catalog.sort_by(|a, b| compare_names(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
	Ok(catalog)
}

/// `pong` as plain text, or `{ "message": "pong" }`, case-insensitive.
pub fn response_is_pong(body: &str) -> bool {
	let trimmed = body.trim();
	if trimmed.is_empty() {
		return false;
	}
	if trimmed.eq_ignore_ascii_case("pong") {
		return true;
	}
	serde_json::from_str::<Value>(trimmed)
		.ok()
		.and_then(|payload| {
			payload
				.get("message")
				.and_then(Value::as_str)
				.map(|message| message.eq_ignore_ascii_case("pong"))
		})
		.unwrap_or(false)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn neighbors_keep_only_string_pairs() {
		let body = r#"{ "neighbors": [
			["p2", "Bob"],
			["p3", "Carol", "extra"],
			[4, "Dan"],
			["p5"],
			"p6",
			["", "Nameless"],
			["p7", null]
		] }"#;
		assert_eq!(
			parse_neighbors(body).unwrap(),
			vec![NeighborEntry::new("p2", "Bob"), NeighborEntry::new("p3", "Carol")]
		);
	}

	#[test]
	fn neighbors_of_unexpected_shape_are_empty() {
		assert!(parse_neighbors(r#"{ "neighbors": "nope" }"#).unwrap().is_empty());
		assert!(parse_neighbors("{}").unwrap().is_empty());
		assert!(parse_neighbors("null").unwrap().is_empty());
		assert!(matches!(parse_neighbors("<html>"), Err(FetchError::Decode(_))));
	}

	#[test]
	fn endpoints_are_id_name_pairs() {
		let endpoints =
			parse_endpoints(r#"{ "source": ["p1", "Alice"], "target": ["p5", "Eve"] }"#).unwrap();
		assert_eq!(endpoints.source, NeighborEntry::new("p1", "Alice"));
		assert_eq!(endpoints.target, NeighborEntry::new("p5", "Eve"));
		assert!(parse_endpoints(r#"{ "source": ["p1"], "target": ["p5", "Eve"] }"#).is_err());
		assert!(parse_endpoints(r#"{ "source": ["", "x"], "target": ["p5", "Eve"] }"#).is_err());
	}

	#[test]
	fn player_list_is_sorted_and_filtered() {
		let body = r#"{ "p2": "Zed", "p1": "Amy", "p3": 7, "p4": "Amy", "p5": "Édgar" }"#;
		let ids: Vec<_> = parse_player_list(body)
			.unwrap()
			.into_iter()
			.map(|entry| entry.id)
			.collect();
		assert_eq!(ids, ["p1", "p4", "p5", "p2"]);
		assert!(parse_player_list("[]").is_err());
	}

	#[test]
	fn pong_detection() {
		assert!(response_is_pong("pong"));
		assert!(response_is_pong("  PONG\n"));
		assert!(response_is_pong(r#"{ "message": "Pong" }"#));
		assert!(!response_is_pong(r#"{ "message": "ping" }"#));
		assert!(!response_is_pong(r#"{ "status": "pong" }"#));
		assert!(!response_is_pong(""));
		assert!(!response_is_pong("<html>pong</html>"));
	}
}

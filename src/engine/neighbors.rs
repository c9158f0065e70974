//! Neighbor lookups with at most one outstanding request per node.
//!
//! Results are cached for the lifetime of a game and shared as immutable
//! `Rc<[NeighborEntry]>` handles. Concurrent requests for the same node join a
//! single [`Shared`] future, so every waiter observes the same outcome and the
//! source is hit once. A request only writes back into the cache while it is
//! still the registered in-flight request for its node; anything invalidated
//! in the meantime settles without leaving a trace.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use async_trait::async_trait;
use futures::future::{self, AbortRegistration, Abortable, FutureExt, LocalBoxFuture, Shared};
use log::{debug, warn};

use super::types::{NeighborEntry, Neighbors, NodeId};
use crate::error::FetchError;

/// Where neighbor lists come from; the HTTP client in production.
#[async_trait(?Send)]
pub trait NeighborSource {
	/// Teammates of `node_id`.
	async fn fetch_neighbors(&self, node_id: &str) -> Result<Vec<NeighborEntry>, FetchError>;
}

/// Settled outcome of a neighbor request.
pub type NeighborResult = Result<Neighbors, FetchError>;

/// Future handed to callers of [`NeighborFetchCoordinator::request`].
pub type NeighborRequest = LocalBoxFuture<'static, NeighborResult>;

type InFlight = Shared<LocalBoxFuture<'static, NeighborResult>>;

struct Pending {
	serial: u64,
	future: InFlight,
}

#[derive(Default)]
struct CoordinatorState {
	cache: HashMap<NodeId, Neighbors>,
	in_flight: HashMap<NodeId, Pending>,
	errors: HashMap<NodeId, FetchError>,
	next_serial: u64,
}

impl CoordinatorState {
	fn settle(&mut self, node_id: &str, serial: u64, outcome: &NeighborResult) {
		let current = matches!(self.in_flight.get(node_id), Some(p) if p.serial == serial);
		if !current {
			debug!("neighbors for {node_id} settled after invalidation, discarding");
			return;
		}
		self.in_flight.remove(node_id);

		match outcome {
			Ok(list) => {
				debug!("cached {} neighbors for {node_id}", list.len());
				self.cache.insert(node_id.to_string(), list.clone());
			}
			Err(err) if err.is_aborted() => {
				debug!("neighbors request for {node_id} aborted");
			}
			Err(err) => {
				warn!("neighbors request for {node_id} failed: {err}");
				self.errors.insert(node_id.to_string(), err.clone());
			}
		}
	}
}

/// Cheap to clone; clones share one cache.
#[derive(Clone)]
pub struct NeighborFetchCoordinator {
	source: Rc<dyn NeighborSource>,
	state: Rc<RefCell<CoordinatorState>>,
}

impl NeighborFetchCoordinator {
	/// An empty cache over `source`.
	pub fn new(source: Rc<dyn NeighborSource>) -> Self {
		Self {
			source,
			state: Rc::new(RefCell::new(CoordinatorState::default())),
		}
	}

	/// Resolve the neighbors of `node_id`.
	///
	/// Cached lists resolve without touching the source. A request already in
	/// flight is joined rather than repeated. `abort` only applies to a
	/// request this call actually issues; aborting resolves every waiter with
	/// [`FetchError::Aborted`] and records nothing.
	pub fn request(&self, node_id: &str, abort: Option<AbortRegistration>) -> NeighborRequest {
		if node_id.is_empty() {
			return future::ready(Ok(Neighbors::from(Vec::new()))).boxed_local();
		}

		let mut state = self.state.borrow_mut();
		if let Some(cached) = state.cache.get(node_id) {
			debug!("neighbors cache hit for {node_id}");
			return future::ready(Ok(cached.clone())).boxed_local();
		}
		if let Some(pending) = state.in_flight.get(node_id) {
			debug!("joining in-flight neighbors request for {node_id}");
			return pending.future.clone().boxed_local();
		}

		state.errors.remove(node_id);
		let serial = state.next_serial;
		state.next_serial += 1;

		let fetch = issue(self.source.clone(), node_id.to_string(), abort);
		let weak: Weak<RefCell<CoordinatorState>> = Rc::downgrade(&self.state);
		let key = node_id.to_string();
		let shared = async move {
			let outcome = fetch.await.map(Neighbors::from);
			if let Some(state) = weak.upgrade() {
				state.borrow_mut().settle(&key, serial, &outcome);
			}
			outcome
		}
		.boxed_local()
		.shared();

		debug!("issuing neighbors request for {node_id}");
		state.in_flight.insert(
			node_id.to_string(),
			Pending {
				serial,
				future: shared.clone(),
			},
		);
		shared.boxed_local()
	}

	/// Drop cached data. `None` clears everything, including in-flight
	/// bookkeeping and recorded errors.
	pub fn invalidate(&self, node_id: Option<&str>) {
		let mut state = self.state.borrow_mut();
		match node_id {
			Some(id) => {
				state.cache.remove(id);
				state.in_flight.remove(id);
				state.errors.remove(id);
			}
			None => {
				state.cache.clear();
				state.in_flight.clear();
				state.errors.clear();
			}
		}
	}

	/// Cached list for `node_id`, if a request has succeeded.
	pub fn cached(&self, node_id: &str) -> Option<Neighbors> {
		self.state.borrow().cache.get(node_id).cloned()
	}

	/// Last genuine failure for `node_id`, cleared when a new request starts.
	pub fn error(&self, node_id: &str) -> Option<FetchError> {
		self.state.borrow().errors.get(node_id).cloned()
	}

	/// True while a request for `node_id` is in flight.
	pub fn is_loading(&self, node_id: &str) -> bool {
		self.state.borrow().in_flight.contains_key(node_id)
	}

	/// Nodes with a request in flight, in no particular order.
	pub fn loading_ids(&self) -> Vec<NodeId> {
		self.state.borrow().in_flight.keys().cloned().collect()
	}
}

fn issue(
	source: Rc<dyn NeighborSource>,
	node_id: String,
	abort: Option<AbortRegistration>,
) -> LocalBoxFuture<'static, Result<Vec<NeighborEntry>, FetchError>> {
	let fetch = async move { source.fetch_neighbors(&node_id).await };
	match abort {
		Some(registration) => Abortable::new(fetch, registration)
			.map(|result| result.unwrap_or(Err(FetchError::Aborted)))
			.boxed_local(),
		None => fetch.boxed_local(),
	}
}

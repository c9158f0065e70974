//! Decides when the neighbors panel asks the coordinator for data.
//!
//! Focus changes are debounced so that clicking through several nodes only
//! fetches the one the player settles on. Caching and de-duplication stay in
//! [`NeighborFetchCoordinator`]; this type only owns focus, the single debounce
//! timer and the abort handle of the fetch it started last.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::AbortHandle;
use futures::task::{LocalSpawn, LocalSpawnExt};
use log::{debug, error};

use super::neighbors::NeighborFetchCoordinator;
use super::types::{Neighbors, NodeId};
use crate::error::FetchError;

/// One-shot timer used for debouncing. Dropping the handle cancels the timer.
pub trait DebounceTimer {
	/// Keeps the timer alive.
	type Handle: 'static;

	/// Run `callback` once after `delay_ms`.
	fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Node the panel is open on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Focus {
	/// Focused node.
	pub id: NodeId,
	/// Header shown above the list.
	pub name: String,
}

struct ActiveFetch {
	serial: u64,
	abort: AbortHandle,
}

struct PanelState<H> {
	focus: Option<Focus>,
	debounce: Option<(u64, H)>,
	active: Option<ActiveFetch>,
	target_id: Option<NodeId>,
	next_serial: u64,
}

struct PanelInner<T: DebounceTimer> {
	coordinator: NeighborFetchCoordinator,
	timer: T,
	spawner: Rc<dyn LocalSpawn>,
	debounce_ms: u32,
	state: RefCell<PanelState<T::Handle>>,
	on_change: RefCell<Option<Rc<dyn Fn()>>>,
}

/// Focus and fetch scheduling of the neighbors panel. Clones share state.
pub struct NeighborPanel<T: DebounceTimer> {
	inner: Rc<PanelInner<T>>,
}

impl<T: DebounceTimer> Clone for NeighborPanel<T> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T: DebounceTimer + 'static> NeighborPanel<T> {
	/// A closed panel over `coordinator`.
	pub fn new(
		coordinator: NeighborFetchCoordinator,
		timer: T,
		spawner: Rc<dyn LocalSpawn>,
		debounce_ms: u32,
	) -> Self {
		Self {
			inner: Rc::new(PanelInner {
				coordinator,
				timer,
				spawner,
				debounce_ms,
				state: RefCell::new(PanelState {
					focus: None,
					debounce: None,
					active: None,
					target_id: None,
					next_serial: 0,
				}),
				on_change: RefCell::new(None),
			}),
		}
	}

	/// Called after every visible change (focus, loading, settled fetch).
	pub fn set_on_change(&self, listener: impl Fn() + 'static) {
		*self.inner.on_change.borrow_mut() = Some(Rc::new(listener));
	}

	/// The target's neighbors are never fetched; finding it ends the game.
	pub fn set_target(&self, target_id: Option<&str>) {
		self.inner.state.borrow_mut().target_id = target_id.map(str::to_string);
	}

	/// Focus `node_id` and fetch its neighbors after the debounce, unless cached.
	pub fn open(&self, node_id: &str, name: &str) {
		if node_id.is_empty() {
			return;
		}
		let name = if name.trim().is_empty() { "Unknown" } else { name };
		{
			let mut state = self.inner.state.borrow_mut();
			state.focus = Some(Focus {
				id: node_id.to_string(),
				name: name.to_string(),
			});
			state.debounce = None;
		}
		PanelInner::schedule(&self.inner, node_id, false, true);
		self.inner.notify();
	}

	/// Clear focus. A fetch already running keeps going and fills the cache.
	pub fn close(&self) {
		self.inner.state.borrow_mut().focus = None;
		self.inner.notify();
	}

	/// Fetch immediately, skipping the debounce.
	pub fn prefetch(&self, node_id: &str) {
		PanelInner::schedule(&self.inner, node_id, false, false);
	}

	/// Refetch the focused node, bypassing the cache.
	pub fn refresh(&self) {
		let focused = self.inner.state.borrow().focus.as_ref().map(|f| f.id.clone());
		if let Some(id) = focused {
			PanelInner::start_fetch(&self.inner, &id, true);
		}
	}

	/// Forget focus and timers, e.g. when a new game starts.
	pub fn reset(&self) {
		{
			let mut state = self.inner.state.borrow_mut();
			state.focus = None;
			state.debounce = None;
			if let Some(active) = state.active.take() {
				active.abort.abort();
			}
		}
		self.inner.notify();
	}

	/// Current focus, if the panel is open.
	pub fn focus(&self) -> Option<Focus> {
		self.inner.state.borrow().focus.clone()
	}

	/// Whether a node is focused.
	pub fn is_open(&self) -> bool {
		self.inner.state.borrow().focus.is_some()
	}

	/// A focus change is waiting out the debounce.
	pub fn has_pending_debounce(&self) -> bool {
		self.inner.state.borrow().debounce.is_some()
	}

	/// Cached neighbors of the focused node.
	pub fn neighbors(&self) -> Option<Neighbors> {
		let id = self.focus()?.id;
		self.inner.coordinator.cached(&id)
	}

	/// A request for the focused node is in flight.
	pub fn is_loading(&self) -> bool {
		self.focus()
			.is_some_and(|f| self.inner.coordinator.is_loading(&f.id))
	}

	/// Last failure for the focused node.
	pub fn error(&self) -> Option<FetchError> {
		let id = self.focus()?.id;
		self.inner.coordinator.error(&id)
	}
}

impl<T: DebounceTimer + 'static> PanelInner<T> {
	fn notify(&self) {
		let listener = self.on_change.borrow().clone();
		if let Some(listener) = listener {
			listener();
		}
	}

	fn skips(&self, node_id: &str, force: bool) -> bool {
		if node_id.is_empty() {
			return true;
		}
		if self.state.borrow().target_id.as_deref() == Some(node_id) {
			return true;
		}
		!force && self.coordinator.cached(node_id).is_some()
	}

	fn schedule(this: &Rc<Self>, node_id: &str, force: bool, debounced: bool) {
		if this.skips(node_id, force) {
			return;
		}
		if !debounced {
			Self::start_fetch(this, node_id, force);
			return;
		}
		if this.coordinator.is_loading(node_id) {
			// Someone else is already fetching it; wait on their request.
			Self::watch(this, node_id);
			return;
		}

		let weak = Rc::downgrade(this);
		let id = node_id.to_string();
		let mut state = this.state.borrow_mut();
		let generation = state.next_serial;
		state.next_serial += 1;
		// Replacing the handle cancels the previous timer.
		state.debounce = None;
		let handle = this.timer.schedule(
			this.debounce_ms,
			Box::new(move || {
				if let Some(inner) = weak.upgrade() {
					Self::fire(&inner, generation, &id, force);
				}
			}),
		);
		state.debounce = Some((generation, handle));
		debug!("debouncing neighbors fetch for {node_id}");
	}

	fn fire(this: &Rc<Self>, generation: u64, node_id: &str, force: bool) {
		let current = matches!(this.state.borrow().debounce, Some((g, _)) if g == generation);
		if current {
			Self::start_fetch(this, node_id, force);
		}
	}

	fn start_fetch(this: &Rc<Self>, node_id: &str, force: bool) {
		if this.skips(node_id, force) {
			return;
		}
		if !force && this.coordinator.is_loading(node_id) {
			// Already in flight, possibly our own fetch; aborting would drop it.
			this.state.borrow_mut().debounce = None;
			Self::watch(this, node_id);
			this.notify();
			return;
		}
		let (abort, registration) = AbortHandle::new_pair();
		let serial = {
			let mut state = this.state.borrow_mut();
			if let Some(previous) = state.active.take() {
				previous.abort.abort();
			}
			state.debounce = None;
			let serial = state.next_serial;
			state.next_serial += 1;
			state.active = Some(ActiveFetch { serial, abort });
			serial
		};
		if force {
			this.coordinator.invalidate(Some(node_id));
		}

		let request = this.coordinator.request(node_id, Some(registration));
		let weak = Rc::downgrade(this);
		let spawned = this.spawner.spawn_local(async move {
			let _ = request.await;
			if let Some(inner) = weak.upgrade() {
				inner.finish(serial);
			}
		});
		if let Err(err) = spawned {
			error!("could not spawn neighbors fetch for {node_id}: {err}");
		}
		this.notify();
	}

	fn watch(this: &Rc<Self>, node_id: &str) {
		let request = this.coordinator.request(node_id, None);
		let weak: Weak<Self> = Rc::downgrade(this);
		let spawned = this.spawner.spawn_local(async move {
			let _ = request.await;
			if let Some(inner) = weak.upgrade() {
				inner.notify();
			}
		});
		if let Err(err) = spawned {
			error!("could not watch neighbors fetch for {node_id}: {err}");
		}
	}

	fn finish(&self, serial: u64) {
		{
			let mut state = self.state.borrow_mut();
			if state.active.as_ref().is_some_and(|a| a.serial == serial) {
				state.active = None;
			}
		}
		self.notify();
	}
}

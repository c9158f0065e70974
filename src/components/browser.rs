use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use gloo_timers::callback::Timeout;

use crate::engine::DebounceTimer;

/// `setTimeout`-backed debounce timer; dropping the handle clears it.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimer;

impl DebounceTimer for BrowserTimer {
	type Handle = Timeout;

	fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Timeout {
		Timeout::new(delay_ms, callback)
	}
}

/// Runs engine tasks on the page's microtask queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
	fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
		leptos::task::spawn_local(future);
		Ok(())
	}
}

//! Waking the service before a game.
//!
//! The backend sleeps when idle. A fire-and-forget ping on load starts it
//! up, and the play button retries a few jittered pings before giving up.

use std::future::Future;

use futures::future::{self, Either};
use gloo_timers::future::TimeoutFuture;
use log::debug;

use super::client::GraphApi;
use super::payload::response_is_pong;
use crate::error::FetchError;

/// Pings sent before giving up on a sleeping service.
pub const MAX_ATTEMPTS: u32 = 3;
/// Per-ping timeout, drawn at random from this range.
pub const TIMEOUT_RANGE_MS: (u32, u32) = (1000, 2000);
/// Pause between pings, drawn at random from this range.
pub const RETRY_DELAY_RANGE_MS: (u32, u32) = (200, 500);

/// Maps `unit` in `[0, 1)` onto the inclusive range `[min, max]`.
pub fn pick_in_range(min: u32, max: u32, unit: f64) -> u32 {
	if max <= min {
		return min;
	}
	let span = f64::from(max - min + 1);
	let offset = (unit.clamp(0.0, 1.0) * span).floor() as u32;
	min + offset.min(max - min)
}

fn jitter((min, max): (u32, u32)) -> u32 {
	pick_in_range(min, max, js_sys::Math::random())
}

async fn ping_with_timeout(api: &GraphApi, timeout_ms: u32) -> Result<String, FetchError> {
	let ping = Box::pin(api.ping());
	match future::select(ping, TimeoutFuture::new(timeout_ms)).await {
		Either::Left((outcome, _)) => outcome,
		Either::Right(((), _)) => Err(FetchError::Transport(format!(
			"ping timed out after {timeout_ms} ms"
		))),
	}
}

/// One ping on page load; failures are only logged.
pub async fn warm_on_render(api: &GraphApi) {
	if let Err(err) = ping_with_timeout(api, jitter(TIMEOUT_RANGE_MS)).await {
		debug!("warm-up ping failed (ignored): {err}");
	}
}

/// Whether the service answered `pong` within [`MAX_ATTEMPTS`] tries.
pub async fn ping_for_play(api: &GraphApi) -> bool {
	retry_until_pong(
		MAX_ATTEMPTS,
		|| ping_with_timeout(api, jitter(TIMEOUT_RANGE_MS)),
		|| TimeoutFuture::new(jitter(RETRY_DELAY_RANGE_MS)),
	)
	.await
}

/// Runs `attempt` until it yields a pong body, pausing between tries but not
/// after the last one.
pub async fn retry_until_pong<A, AF, P, PF>(attempts: u32, mut attempt: A, mut pause: P) -> bool
where
	A: FnMut() -> AF,
	AF: Future<Output = Result<String, FetchError>>,
	P: FnMut() -> PF,
	PF: Future<Output = ()>,
{
	for round in 1..=attempts {
		match attempt().await {
			Ok(body) if response_is_pong(&body) => return true,
			Ok(body) => debug!("ping attempt {round}: unexpected body {body:?}"),
			Err(err) => debug!("ping attempt {round} failed: {err}"),
		}
		if round < attempts {
			pause().await;
		}
	}
	false
}

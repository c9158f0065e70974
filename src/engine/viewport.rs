//! Camera state for the board.
//!
//! The controller keeps two transforms: the baseline computed from the layout
//! (the board's bounding box centered in the canvas) and the camera the player
//! actually sees. New layouts snap the camera to the new baseline. Gestures move
//! the camera away from it and raise the recenter affordance; recentering eases
//! back. Programmatic motion never touches the affordance.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;
use log::debug;

use super::types::{CanvasSize, Position};
use crate::config::ViewportConfig;

/// Translate-then-scale transform applied when drawing the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Horizontal screen offset.
	pub x: f64,
	/// Vertical screen offset.
	pub y: f64,
	/// Scale factor; 1 is unscaled.
	pub zoom: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl Viewport {
	/// No offset, no zoom.
	pub const IDENTITY: Viewport = Viewport {
		x: 0.0,
		y: 0.0,
		zoom: 1.0,
	};

	/// Pure offset at zoom 1.
	pub fn translate(x: f64, y: f64) -> Self {
		Self { x, y, zoom: 1.0 }
	}

	/// Same camera for display purposes, absorbing float and animation jitter.
	pub fn approx_eq(&self, other: &Viewport, config: &ViewportConfig) -> bool {
		(self.x - other.x).abs() <= config.position_tolerance
			&& (self.y - other.y).abs() <= config.position_tolerance
			&& (self.zoom - other.zoom).abs() <= config.zoom_tolerance
	}

	/// Translation that centers the bounding box of `positions` in `canvas`.
	pub fn centered_on<'a>(
		positions: impl IntoIterator<Item = &'a Position>,
		canvas: CanvasSize,
	) -> Self {
		if !canvas.width.is_finite() || !canvas.height.is_finite() {
			return Self::IDENTITY;
		}
		let (min_x, max_x, min_y, max_y) = positions.into_iter().fold(
			(f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
			|(min_x, max_x, min_y, max_y), p| {
				(min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
			},
		);
		if ![min_x, max_x, min_y, max_y].iter().all(|v| v.is_finite()) {
			return Self::IDENTITY;
		}
		let center = canvas.center();
		Self::translate(
			center.x - (min_x + max_x) / 2.0,
			center.y - (min_y + max_y) / 2.0,
		)
	}

	/// Undo the transform for a screen point.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.zoom, (sy - self.y) / self.zoom)
	}

	fn lerp(&self, to: &Viewport, t: f64) -> Viewport {
		Viewport {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			zoom: self.zoom + (to.zoom - self.zoom) * t,
		}
	}
}

/// How a programmatic camera transition ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
	/// Reached its destination.
	Completed,
	/// A newer transform (layout snap, recenter or gesture) took over.
	Superseded,
}

/// Completion of [`ViewportController::recenter`].
pub struct TransitionDone {
	finished: oneshot::Receiver<TransitionOutcome>,
}

impl Future for TransitionDone {
	type Output = TransitionOutcome;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<TransitionOutcome> {
		// A dropped sender means the transition was discarded with its controller.
		self.finished
			.poll_unpin(cx)
			.map(|outcome| outcome.unwrap_or(TransitionOutcome::Superseded))
	}
}

struct Transition {
	from: Viewport,
	to: Viewport,
	duration_ms: f64,
	elapsed_ms: f64,
	done: oneshot::Sender<TransitionOutcome>,
}

fn ease_cubic_in_out(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// Current camera, its auto-centered baseline and any running transition.
pub struct ViewportController {
	config: ViewportConfig,
	canvas: CanvasSize,
	current: Viewport,
	baseline: Viewport,
	show_recenter: bool,
	programmatic: bool,
	transition: Option<Transition>,
}

impl ViewportController {
	/// Identity camera over `canvas`.
	pub fn new(config: ViewportConfig, canvas: CanvasSize) -> Self {
		Self {
			config,
			canvas,
			current: Viewport::IDENTITY,
			baseline: Viewport::IDENTITY,
			show_recenter: false,
			programmatic: false,
			transition: None,
		}
	}

	/// Transform used for the next frame.
	pub fn current(&self) -> Viewport {
		self.current
	}

	/// Where the camera rests when the player has not moved it.
	pub fn baseline(&self) -> Viewport {
		self.baseline
	}

	/// Surface the camera centers on.
	pub fn canvas(&self) -> CanvasSize {
		self.canvas
	}

	/// The player moved the camera away from the baseline.
	pub fn show_recenter(&self) -> bool {
		self.show_recenter
	}

	/// A recenter animation is running.
	pub fn is_transitioning(&self) -> bool {
		self.transition.is_some()
	}

	/// New surface size; takes effect at the next fit.
	pub fn resize(&mut self, canvas: CanvasSize) {
		self.canvas = canvas;
	}

	/// Snap to the viewport centering `positions`, which becomes the new
	/// baseline.
	pub fn fit<'a>(&mut self, positions: impl IntoIterator<Item = &'a Position>) {
		let target = Viewport::centered_on(positions, self.canvas);
		self.supersede();
		self.programmatic = false;
		self.current = target;
		self.baseline = target;
		self.show_recenter = false;
		debug!("camera snapped to ({:.1}, {:.1})", target.x, target.y);
	}

	/// Back to identity, e.g. for a fresh board.
	pub fn reset(&mut self) {
		self.supersede();
		self.current = Viewport::IDENTITY;
		self.baseline = Viewport::IDENTITY;
		self.show_recenter = false;
		self.programmatic = false;
	}

	/// Drag the camera by a screen-space offset.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		let next = Viewport {
			x: self.current.x + dx,
			y: self.current.y + dy,
			..self.current
		};
		self.set_user_transform(next);
	}

	/// Zoom by `factor` around the screen point `(sx, sy)`, which stays put.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let zoom = self.clamp_zoom(self.current.zoom * factor);
		let ratio = zoom / self.current.zoom;
		let next = Viewport {
			x: sx - (sx - self.current.x) * ratio,
			y: sy - (sy - self.current.y) * ratio,
			zoom,
		};
		self.set_user_transform(next);
	}

	/// Apply a camera produced by a player gesture.
	pub fn set_user_transform(&mut self, viewport: Viewport) {
		if self.transition.is_some() {
			debug!("gesture interrupted camera transition");
			self.supersede();
			self.programmatic = false;
		}
		self.current = Viewport {
			zoom: self.clamp_zoom(viewport.zoom),
			..viewport
		};
		self.refresh_affordance();
	}

	/// Ease back to the baseline. Resolves when the camera arrives, or with
	/// [`TransitionOutcome::Superseded`] if something else moves it first.
	pub fn recenter(&mut self, duration_ms: f64) -> TransitionDone {
		self.supersede();
		let (done, finished) = oneshot::channel();
		let to = self.baseline;
		if duration_ms > 0.0 {
			self.programmatic = true;
			self.transition = Some(Transition {
				from: self.current,
				to,
				duration_ms,
				elapsed_ms: 0.0,
				done,
			});
		} else {
			self.current = to;
			self.show_recenter = false;
			let _ = done.send(TransitionOutcome::Completed);
		}
		TransitionDone { finished }
	}

	/// Advance a running transition; returns whether one is still running.
	pub fn tick(&mut self, dt_ms: f64) -> bool {
		let Some(transition) = self.transition.as_mut() else {
			return false;
		};
		transition.elapsed_ms += dt_ms;
		let t = (transition.elapsed_ms / transition.duration_ms).clamp(0.0, 1.0);
		self.current = transition.from.lerp(&transition.to, ease_cubic_in_out(t));
		if t < 1.0 {
			return true;
		}

		if let Some(transition) = self.transition.take() {
			self.current = transition.to;
			let _ = transition.done.send(TransitionOutcome::Completed);
		}
		self.programmatic = false;
		self.show_recenter = false;
		false
	}

	fn supersede(&mut self) {
		if let Some(transition) = self.transition.take() {
			let _ = transition.done.send(TransitionOutcome::Superseded);
		}
	}

	fn refresh_affordance(&mut self) {
		if self.programmatic {
			return;
		}
		self.show_recenter = !self.current.approx_eq(&self.baseline, &self.config);
	}

	fn clamp_zoom(&self, zoom: f64) -> f64 {
		if zoom.is_finite() {
			zoom.clamp(self.config.min_zoom, self.config.max_zoom)
		} else {
			self.current.zoom
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn controller() -> ViewportController {
		ViewportController::new(ViewportConfig::default(), CanvasSize::new(800.0, 600.0))
	}

	fn board() -> Vec<Position> {
		vec![
			Position::new(100.0, 100.0),
			Position::new(300.0, 200.0),
			Position::new(200.0, 400.0),
		]
	}

	#[test]
	fn tolerance_absorbs_jitter_only() {
		let config = ViewportConfig::default();
		let base = Viewport {
			x: 10.0,
			y: 20.0,
			zoom: 1.0,
		};
		let near = Viewport {
			x: 11.0,
			y: 19.0,
			zoom: 1.005,
		};
		assert!(base.approx_eq(&near, &config));
		assert!(!base.approx_eq(&Viewport { x: 12.0, ..base }, &config));
		assert!(!base.approx_eq(&Viewport { y: 18.0, ..base }, &config));
		assert!(!base.approx_eq(&Viewport { zoom: 1.01, ..base }, &config));
	}

	#[test]
	fn centers_the_bounding_box() {
		let canvas = CanvasSize::new(800.0, 600.0);
		let viewport = Viewport::centered_on(&board(), canvas);
		assert_eq!(viewport, Viewport::translate(200.0, 50.0));
		assert_eq!(Viewport::centered_on(std::iter::empty(), canvas), Viewport::IDENTITY);
	}

	#[test]
	fn fit_snaps_and_hides_affordance() {
		let mut camera = controller();
		camera.pan_by(50.0, 0.0);
		assert!(camera.show_recenter());

		camera.fit(&board());
		assert_eq!(camera.current(), Viewport::translate(200.0, 50.0));
		assert_eq!(camera.baseline(), camera.current());
		assert!(!camera.show_recenter());
	}

	#[test]
	fn small_gestures_keep_the_affordance_hidden() {
		let mut camera = controller();
		camera.fit(&board());
		camera.pan_by(0.5, -1.0);
		assert!(!camera.show_recenter());
		camera.pan_by(2.0, 0.0);
		assert!(camera.show_recenter());
		camera.pan_by(-2.0, 0.0);
		assert!(!camera.show_recenter());
	}

	#[test]
	fn zoom_keeps_cursor_fixed_and_clamps() {
		let mut camera = controller();
		camera.fit(&board());
		let before = camera.current().screen_to_graph(400.0, 300.0);
		camera.zoom_at(400.0, 300.0, 1.1);
		let after = camera.current().screen_to_graph(400.0, 300.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
		assert!(camera.show_recenter());

		for _ in 0..50 {
			camera.zoom_at(400.0, 300.0, 1.1);
		}
		assert_eq!(camera.current().zoom, 2.0);
		for _ in 0..50 {
			camera.zoom_at(400.0, 300.0, 0.9);
		}
		assert_eq!(camera.current().zoom, 0.6);
	}

	#[test]
	fn recenter_eases_back_then_hides_affordance() {
		let mut camera = controller();
		camera.fit(&board());
		camera.pan_by(120.0, -80.0);
		let done = camera.recenter(400.0);

		assert!(camera.tick(100.0));
		let midway = camera.current();
		assert_ne!(midway, camera.baseline());
		assert!(camera.show_recenter(), "affordance is frozen while moving");

		let mut done = done;
		assert!((&mut done).now_or_never().is_none());
		while camera.tick(100.0) {}
		assert_eq!(camera.current(), camera.baseline());
		assert!(!camera.show_recenter());
		assert_eq!(done.now_or_never(), Some(TransitionOutcome::Completed));
	}

	#[test]
	fn newer_transforms_supersede_a_transition() {
		let mut camera = controller();
		camera.fit(&board());
		camera.pan_by(120.0, 0.0);
		let first = camera.recenter(400.0);
		let second = camera.recenter(400.0);
		assert_eq!(first.now_or_never(), Some(TransitionOutcome::Superseded));

		camera.tick(50.0);
		camera.fit(&[Position::new(0.0, 0.0)]);
		assert_eq!(second.now_or_never(), Some(TransitionOutcome::Superseded));
		assert!(!camera.is_transitioning());
		assert_eq!(camera.current(), Viewport::translate(400.0, 300.0));
	}

	#[test]
	fn gesture_interrupts_a_transition() {
		let mut camera = controller();
		camera.fit(&board());
		camera.pan_by(200.0, 0.0);
		let done = camera.recenter(400.0);
		camera.tick(100.0);

		camera.pan_by(30.0, 0.0);
		assert_eq!(done.now_or_never(), Some(TransitionOutcome::Superseded));
		assert!(!camera.is_transitioning());
		assert!(camera.show_recenter());
	}

	#[test]
	fn instant_recenter_completes_immediately() {
		let mut camera = controller();
		camera.fit(&board());
		camera.pan_by(10.0, 10.0);
		let done = camera.recenter(0.0);
		assert_eq!(done.now_or_never(), Some(TransitionOutcome::Completed));
		assert_eq!(camera.current(), camera.baseline());
		assert!(!camera.show_recenter());
	}
}

//! Game and engine tuning.
//!
//! Every field has a default matching the deployed game, so an empty JSON
//! object is a valid configuration. The API base URL can also be baked in at
//! build time through `SIX_DEGREES_API_BASE`.

use log::warn;
use serde::Deserialize;

use crate::error::ConfigError;

/// Relationship service used when no override is baked in.
pub const DEFAULT_API_BASE: &str = "https://api.sixdegrees.kabirwahi.com/api/football";

/// Top-level settings for every game mode.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
	/// Base URL of the relationship service; routes go in `?path=`.
	pub api_base_url: String,
	/// Step budget for challenge games; `None` disables the lose condition.
	pub max_steps: Option<usize>,
	/// Quiet period before a panel focus change fetches neighbors.
	pub debounce_ms: u32,
	/// Length of the recenter animation.
	pub recenter_duration_ms: f64,
	/// Starting clock of a time trial.
	pub time_trial_secs: u32,
	/// Seconds added to the time trial clock per win.
	pub time_bonus_secs: u32,
	/// Force simulation.
	pub layout: LayoutConfig,
	/// Camera.
	pub viewport: ViewportConfig,
}

impl Default for GameConfig {
	fn default() -> Self {
		Self {
			api_base_url: option_env!("SIX_DEGREES_API_BASE")
				.unwrap_or(DEFAULT_API_BASE)
				.to_string(),
			max_steps: Some(6),
			debounce_ms: 150,
			recenter_duration_ms: 400.0,
			time_trial_secs: 120,
			time_bonus_secs: 20,
			layout: LayoutConfig::default(),
			viewport: ViewportConfig::default(),
		}
	}
}

/// Force simulation tuning.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
	/// Rest length of a link.
	pub link_distance: f64,
	/// How hard a link pulls toward its rest length, 0 to 1.
	pub link_strength: f64,
	/// Many-body strength; negative values repel.
	pub charge_strength: f64,
	/// Minimum distance kept between node centers, halved per node.
	pub collision_radius: f64,
	/// Ticks for an empty board, reduced by `ticks_per_node` per node.
	pub base_ticks: usize,
	/// Ticks taken off the budget per node on the board.
	pub ticks_per_node: usize,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			link_distance: 200.0,
			link_strength: 0.3,
			charge_strength: -80.0,
			collision_radius: 80.0,
			base_ticks: 40,
			ticks_per_node: 2,
		}
	}
}

/// Camera limits and the tolerance used to compare transforms.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
	/// Pixels of offset still considered "at the baseline".
	pub position_tolerance: f64,
	/// Zoom difference still considered "at the baseline".
	pub zoom_tolerance: f64,
	/// Zoom limits for wheel gestures.
	pub min_zoom: f64,
	/// Upper zoom limit.
	pub max_zoom: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			position_tolerance: 1.0,
			zoom_tolerance: 0.005,
			min_zoom: 0.6,
			max_zoom: 2.0,
		}
	}
}

impl GameConfig {
	/// Parse a (possibly partial) JSON override and validate it.
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let config: GameConfig = serde_json::from_str(raw)?;
		config.validate()?;
		Ok(config)
	}

	/// Defaults, overridden by the JSON document baked in through
	/// `SIX_DEGREES_CONFIG` when present. A bad document is logged and ignored.
	pub fn load() -> Self {
		let Some(raw) = option_env!("SIX_DEGREES_CONFIG") else {
			return Self::default();
		};
		Self::from_json(raw).unwrap_or_else(|err| {
			warn!("ignoring SIX_DEGREES_CONFIG: {err}");
			Self::default()
		})
	}

	/// Configuration for free exploration: same tuning, no step budget.
	pub fn exploration(&self) -> Self {
		Self {
			max_steps: None,
			..self.clone()
		}
	}

	/// Reject settings the engine cannot work with.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.api_base_url.trim().is_empty() {
			return Err(invalid("api_base_url", "must not be empty"));
		}
		if self.time_trial_secs == 0 {
			return Err(invalid("time_trial_secs", "must be positive"));
		}
		if !(self.layout.link_distance > 0.0) {
			return Err(invalid("layout.link_distance", "must be positive"));
		}
		if !(self.layout.collision_radius > 0.0) {
			return Err(invalid("layout.collision_radius", "must be positive"));
		}
		let vp = &self.viewport;
		if !(vp.min_zoom > 0.0) || vp.min_zoom > vp.max_zoom {
			return Err(invalid(
				"viewport",
				format!("zoom extent [{}, {}] is empty", vp.min_zoom, vp.max_zoom),
			));
		}
		Ok(())
	}
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
	ConfigError::Invalid {
		field,
		reason: reason.into(),
	}
}

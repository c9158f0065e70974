//! Error types for service requests and configuration.

use thiserror::Error;

/// Failure of a single request against the relationship-graph service.
///
/// Clonable so one shared in-flight request can hand the same outcome to every
/// waiter.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
	/// Non-success HTTP status.
	#[error("request failed with status {0}")]
	Status(u16),
	/// The request never produced a response.
	#[error("request failed: {0}")]
	Transport(String),
	/// The body did not have the expected shape.
	#[error("malformed response: {0}")]
	Decode(String),
	/// Cancelled by the caller.
	#[error("request aborted")]
	Aborted,
}

impl FetchError {
	/// Aborts are intentional and never shown to the player.
	pub fn is_aborted(&self) -> bool {
		matches!(self, FetchError::Aborted)
	}
}

impl From<reqwest::Error> for FetchError {
	fn from(err: reqwest::Error) -> Self {
		if let Some(status) = err.status() {
			FetchError::Status(status.as_u16())
		} else if err.is_decode() {
			FetchError::Decode(err.to_string())
		} else {
			FetchError::Transport(err.to_string())
		}
	}
}

impl From<serde_json::Error> for FetchError {
	fn from(err: serde_json::Error) -> Self {
		FetchError::Decode(err.to_string())
	}
}

/// Why a configuration document was rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Not valid JSON, or a field has the wrong type.
	#[error("invalid config document: {0}")]
	Parse(#[from] serde_json::Error),
	/// Well-formed but unusable value.
	#[error("invalid config value for `{field}`: {reason}")]
	Invalid {
		/// Dotted path of the offending setting.
		field: &'static str,
		/// What is wrong with it.
		reason: String,
	},
}

//! Error taxonomy for session orchestration.

use std::time::Duration;

use thiserror::Error;

use crate::view::Feature;

/// Errors raised by orchestration operations.
///
/// A convergence run that never settles is not an error; it surfaces as
/// `None` from [`crate::TurnExecutor::send_turn`].
#[derive(Debug, Error)]
pub enum Error {
	/// The remote session has not been established (login not detected yet).
	#[error("session is not authenticated; log in first")]
	NotAuthenticated,

	/// Another mutating operation holds the session guard.
	#[error("session is busy with another operation; retry later")]
	Busy,

	/// No text-entry surface matched any of the candidate selectors.
	#[error("prompt input field not found (tried: {})", .candidates.join(", "))]
	InputNotFound { candidates: Vec<String> },

	/// An expected element of the remote view is absent.
	#[error("element not found: {0}")]
	ElementNotFound(String),

	/// Caller-supplied arguments were rejected before touching the view.
	#[error("invalid input: {0}")]
	InvalidInput(String),

	/// The opening turn of a dialogue produced no reply to continue from.
	#[error("no reply received for the initial prompt")]
	NoInitialReply,

	/// A feature toggle was clicked but the view did not reflect the new state.
	#[error("{feature} is still {} after toggling", remaining_state(.enabled))]
	ToggleNotApplied { feature: Feature, enabled: bool },

	/// A bounded wait other than reply convergence ran out.
	#[error("timed out after {}ms waiting for {condition}", .elapsed.as_millis())]
	Timeout { elapsed: Duration, condition: String },

	/// The remote-view driver failed.
	#[error("remote view error: {0}")]
	View(String),
}

impl Error {
	/// Wraps any driver-side failure as [`Error::View`].
	pub fn view(err: impl std::fmt::Display) -> Self {
		Error::View(err.to_string())
	}
}

fn remaining_state(requested: &bool) -> &'static str {
	if *requested { "disabled" } else { "enabled" }
}

/// Result alias for orchestration operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Timing and layout configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable [`Config`]. Durations are stored as milliseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default interval between reply samples.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 150;
/// Default time a reply must stay unchanged to count as settled.
pub const DEFAULT_SETTLE_MS: u64 = 2_000;
/// Default ceiling for an interactive reply.
pub const DEFAULT_CEILING_MS: u64 = 50_000;
/// Default ceiling for best-effort relayed messages.
pub const DEFAULT_RELAY_CEILING_MS: u64 = 20_000;
/// Default number of dialogue turns.
pub const DEFAULT_MAX_TURNS: u32 = 30;

/// Complete orchestration configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
	pub timings: Timings,
	pub layout: Layout,
	pub dialogue: DialogueSettings,
}

/// Wait and polling budgets, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timings {
	pub poll_interval_ms: u64,
	pub settle_ms: u64,
	pub ceiling_ms: u64,
	pub relay_ceiling_ms: u64,
	/// Per-candidate wait when locating the prompt input.
	pub locate_wait_ms: u64,
	/// Wait for controls that appear after a click (project modal).
	pub control_wait_ms: u64,
	/// Short pause letting the view react to a click.
	pub action_pause_ms: u64,
	pub turn_pause_ms: u64,
	pub login_poll_ms: u64,
	pub login_timeout_ms: u64,
}

impl Default for Timings {
	fn default() -> Self {
		Self {
			poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
			settle_ms: DEFAULT_SETTLE_MS,
			ceiling_ms: DEFAULT_CEILING_MS,
			relay_ceiling_ms: DEFAULT_RELAY_CEILING_MS,
			locate_wait_ms: 8_000,
			control_wait_ms: 5_000,
			action_pause_ms: 300,
			turn_pause_ms: 2_000,
			login_poll_ms: 2_000,
			login_timeout_ms: 300_000,
		}
	}
}

impl Timings {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn settle(&self) -> Duration {
		Duration::from_millis(self.settle_ms)
	}

	pub fn ceiling(&self) -> Duration {
		Duration::from_millis(self.ceiling_ms)
	}

	pub fn relay_ceiling(&self) -> Duration {
		Duration::from_millis(self.relay_ceiling_ms)
	}

	pub fn locate_wait(&self) -> Duration {
		Duration::from_millis(self.locate_wait_ms)
	}

	pub fn control_wait(&self) -> Duration {
		Duration::from_millis(self.control_wait_ms)
	}

	pub fn action_pause(&self) -> Duration {
		Duration::from_millis(self.action_pause_ms)
	}

	pub fn turn_pause(&self) -> Duration {
		Duration::from_millis(self.turn_pause_ms)
	}

	pub fn login_poll(&self) -> Duration {
		Duration::from_millis(self.login_poll_ms)
	}

	pub fn login_timeout(&self) -> Duration {
		Duration::from_millis(self.login_timeout_ms)
	}
}

/// Selectors and labels describing the chat interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Layout {
	/// Prompt input candidates, tried in order.
	pub input_selectors: Vec<String>,
	/// Blocks holding assistant replies; the last one is the current reply.
	pub reply_selector: String,
	/// Present only once the user is logged in.
	pub account_marker: String,
	pub projects_sidebar_toggle: String,
	pub project_create_button: String,
	pub project_name_field: String,
	pub project_instructions_field: String,
	pub project_items: String,
	pub buttons: String,
	pub sidebar_labels: String,
	pub create_project_label: String,
	pub new_chat_label: String,
	/// Button closing the project modal; clicked by overlay dismissal.
	pub cancel_label: String,
}

impl Default for Layout {
	fn default() -> Self {
		Self {
			input_selectors: vec!["p[data-placeholder=\"Ask anything…\"]".into(), "div.ProseMirror".into()],
			reply_selector: ".assistant-msg-container".into(),
			account_marker: "button[data-testid=\"heading:userdropdown\"]".into(),
			projects_sidebar_toggle: "button[aria-label=\"Projects\"]".into(),
			project_create_button: "button.projects-create-button".into(),
			project_name_field: "#project-name".into(),
			project_instructions_field: "#project-instructions".into(),
			project_items: "a.project-sidebar-item span[title]".into(),
			buttons: "button".into(),
			sidebar_labels: "span.sidebar-item-label".into(),
			create_project_label: "create project".into(),
			new_chat_label: "new chat".into(),
			cancel_label: "cancel".into(),
		}
	}
}

/// Dialogue defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialogueSettings {
	pub max_turns: u32,
}

impl Default for DialogueSettings {
	fn default() -> Self {
		Self {
			max_turns: DEFAULT_MAX_TURNS,
		}
	}
}

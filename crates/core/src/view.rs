//! Capabilities consumed from the remote-view driver.
//!
//! The orchestration layer never touches markup directly. Everything it does
//! to the chat interface goes through [`RemoteView`], which a driver (CDP,
//! or a scripted fake in tests) implements. Selectors are opaque strings the
//! driver knows how to resolve; they come from [`crate::config::Layout`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Opaque reference to an element located in the remote view.
///
/// The `id` is driver-defined (a CDP remote object id, a fake's index).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
	id: String,
	label: String,
}

impl ElementHandle {
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	/// Human-readable description (usually the selector that found it).
	pub fn label(&self) -> &str {
		&self.label
	}
}

/// Binary features of the chat interface toggled by clicking a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
	WebSearch,
	GhostMode,
}

impl fmt::Display for Feature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Feature::WebSearch => write!(f, "web search"),
			Feature::GhostMode => write!(f, "ghost mode"),
		}
	}
}

/// Operations a remote-view driver provides to the orchestration layer.
#[async_trait]
pub trait RemoteView: Send + Sync {
	/// Brings the session's view to the foreground.
	async fn focus(&self) -> Result<()>;

	/// Waits up to `wait` for `selector` to match, returning the first match.
	async fn locate(&self, selector: &str, wait: Duration) -> Result<Option<ElementHandle>>;

	/// Returns `true` when `selector` currently matches anything.
	async fn exists(&self, selector: &str) -> Result<bool>;

	/// Text of the last non-empty element matching `selector`, trimmed.
	async fn read_last_text(&self, selector: &str) -> Result<Option<String>>;

	/// Empties an editable element and types `text` into it.
	async fn clear_and_type(&self, handle: &ElementHandle, text: &str) -> Result<()>;

	/// Submits the content of an editable element (Enter).
	async fn submit(&self, handle: &ElementHandle) -> Result<()>;

	async fn click(&self, handle: &ElementHandle) -> Result<()>;

	/// Sets the value of a form field, firing input/change events.
	async fn fill(&self, handle: &ElementHandle, value: &str) -> Result<()>;

	/// First element matching `selector` whose trimmed text equals `text`
	/// case-insensitively.
	async fn find_by_text(&self, selector: &str, text: &str) -> Result<Option<ElementHandle>>;

	/// First element matching `selector` whose `title` attribute equals
	/// `title`, resolved to its clickable container.
	async fn find_by_title(&self, selector: &str, title: &str) -> Result<Option<ElementHandle>>;

	/// Closes modals and drops focus (Escape + blur).
	async fn dismiss_overlays(&self) -> Result<()>;

	/// Current state of `feature`, or `None` when its control is absent.
	async fn feature_state(&self, feature: Feature) -> Result<Option<bool>>;

	/// Clicks the control that flips `feature`.
	async fn toggle_feature(&self, feature: Feature) -> Result<()>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn feature_serializes_kebab_case() {
		assert_eq!(serde_json::to_string(&Feature::WebSearch).unwrap(), "\"web-search\"");
		assert_eq!(serde_json::to_string(&Feature::GhostMode).unwrap(), "\"ghost-mode\"");
	}

	#[test]
	fn handle_exposes_id_and_label() {
		let handle = ElementHandle::new("obj-1", "div.ProseMirror");
		assert_eq!(handle.id(), "obj-1");
		assert_eq!(handle.label(), "div.ProseMirror");
	}
}

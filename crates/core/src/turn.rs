//! One prompt/reply exchange with the chat view.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::{Layout, Timings};
use crate::convergence::ConvergenceDetector;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::view::ElementHandle;

/// Button labels the view renders inside each reply block. Their text gets
/// concatenated into the block's text, so everything from the first label
/// onwards is dropped.
static AFFORDANCES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
	["I like this response", "Report an issue", "Copy", "Regenerate"]
		.iter()
		.map(|label| Regex::new(&format!("(?is){}.*$", regex::escape(label))).expect("affordance pattern should compile"))
		.collect()
});

/// Removes trailing UI-affordance text from a captured reply.
pub fn strip_affordances(text: &str) -> String {
	let mut cleaned = text.trim().to_string();
	for pattern in AFFORDANCES.iter() {
		cleaned = pattern.replace(&cleaned, "").into_owned();
	}
	cleaned.trim().to_string()
}

/// Submits prompts and waits for the settled reply.
#[derive(Debug, Clone)]
pub struct TurnExecutor {
	session: Arc<Session>,
	layout: Layout,
	timings: Timings,
}

impl TurnExecutor {
	pub fn new(session: Arc<Session>, layout: Layout, timings: Timings) -> Self {
		Self { session, layout, timings }
	}

	pub fn session(&self) -> &Arc<Session> {
		&self.session
	}

	/// Sends `prompt` and returns the settled reply.
	///
	/// `Ok(None)` means the reply did not settle within the ceiling; the
	/// prompt was still submitted.
	pub async fn send_turn(&self, prompt: &str) -> Result<Option<String>> {
		self.send_turn_with_ceiling(prompt, self.timings.ceiling()).await
	}

	/// Like [`Self::send_turn`] with an explicit ceiling, for best-effort relays.
	pub async fn send_turn_with_ceiling(&self, prompt: &str, ceiling: Duration) -> Result<Option<String>> {
		self.session.ensure_authenticated()?;
		if prompt.trim().is_empty() {
			return Err(Error::InvalidInput("prompt is required".into()));
		}

		let view = self.session.view();
		view.focus().await?;
		debug!(target = "lumo.turn", "view focused");

		let input = self.locate_input().await?;
		debug!(target = "lumo.turn", input = input.label(), "input found");

		let baseline = self.read_reply().await;
		debug!(target = "lumo.turn", has_previous = baseline.is_some(), "baseline captured");

		view.clear_and_type(&input, prompt).await?;
		view.submit(&input).await?;
		info!(target = "lumo.turn", chars = prompt.len(), "prompt submitted");

		let detector = ConvergenceDetector::from_timings(&self.timings).with_ceiling(ceiling);
		let reply = detector.wait(baseline, || self.read_reply()).await.into_option();

		match &reply {
			Some(text) => info!(target = "lumo.turn", chars = text.len(), "reply received"),
			None => warn!(target = "lumo.turn", ceiling_ms = ceiling.as_millis() as u64, "reply not detected"),
		}
		Ok(reply)
	}

	/// Tries each input candidate in order. When no candidate was reported
	/// absent and at least one lookup failed, the last driver error is
	/// returned instead of [`Error::InputNotFound`].
	async fn locate_input(&self) -> Result<ElementHandle> {
		let view = self.session.view();
		let mut driver_error = None;
		let mut any_absent = false;
		for selector in &self.layout.input_selectors {
			debug!(target = "lumo.turn", %selector, "waiting for input");
			match view.locate(selector, self.timings.locate_wait()).await {
				Ok(Some(handle)) => return Ok(handle),
				Ok(None) => any_absent = true,
				Err(err) => {
					warn!(target = "lumo.turn", %selector, error = %err, "input lookup failed");
					driver_error = Some(err);
				}
			}
		}
		if let (false, Some(err)) = (any_absent, driver_error) {
			return Err(err);
		}
		Err(Error::InputNotFound {
			candidates: self.layout.input_selectors.clone(),
		})
	}

	/// Last reply block with affordances stripped; read failures count as absent.
	async fn read_reply(&self) -> Option<String> {
		match self.session.view().read_last_text(&self.layout.reply_selector).await {
			Ok(text) => text.map(|t| strip_affordances(&t)).filter(|t| !t.is_empty()),
			Err(err) => {
				debug!(target = "lumo.turn", error = %err, "reply read failed");
				None
			}
		}
	}
}

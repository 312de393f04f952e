//! Scripted in-memory [`RemoteView`] for tests and dry runs.
//!
//! Holds a set of selectors that currently match, a queue of replies that
//! submissions reveal, and an action log to assert against.
//!
//! ```ignore
//! let view = Arc::new(
//!     FakeView::new()
//!         .with_present("div.ProseMirror")
//!         .with_reply(ScriptedReply::text("Paris")),
//! );
//! let session = Arc::new(Session::new(view.clone()));
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::error::{Error, Result};
use crate::view::{ElementHandle, Feature, RemoteView};

/// What the view does after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
	/// A new reply block appears with this text.
	Text(String),
	/// A new block appears and grows one chunk per read.
	Streaming(Vec<String>),
	/// Nothing is rendered.
	Silent,
	/// The submission itself fails with a view error.
	Fail(String),
}

impl ScriptedReply {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}
}

/// One recorded interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	Focus,
	Type { target: String, text: String },
	Submit { target: String },
	Click { target: String },
	Fill { target: String, value: String },
	Dismiss,
	Toggle(Feature),
}

#[derive(Debug, Default)]
struct FakeState {
	present: HashSet<String>,
	reveals: HashMap<String, Vec<String>>,
	texts: Vec<(String, String)>,
	titles: Vec<(String, String)>,
	features: HashMap<Feature, bool>,
	stuck: HashSet<Feature>,
	script: VecDeque<ScriptedReply>,
	blocks: Vec<String>,
	streaming: VecDeque<String>,
	actions: Vec<Action>,
	disconnected: Option<String>,
}

/// Scripted remote view. See the module docs.
#[derive(Debug, Default)]
pub struct FakeView {
	state: Mutex<FakeState>,
}

impl FakeView {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks `selector` as matching.
	pub fn with_present(self, selector: &str) -> Self {
		self.set_present(selector, true);
		self
	}

	/// Makes `selectors` match once an element found by `clicked` is clicked.
	pub fn with_reveal_on_click(self, clicked: &str, selectors: &[&str]) -> Self {
		self.lock()
			.reveals
			.insert(clicked.to_string(), selectors.iter().map(|s| s.to_string()).collect());
		self
	}

	/// Adds an element under `selector` whose visible text is `text`.
	pub fn with_text(self, selector: &str, text: &str) -> Self {
		self.lock().texts.push((selector.to_string(), text.to_string()));
		self
	}

	/// Adds an element under `selector` whose `title` attribute is `title`.
	pub fn with_title(self, selector: &str, title: &str) -> Self {
		self.lock().titles.push((selector.to_string(), title.to_string()));
		self
	}

	pub fn with_feature(self, feature: Feature, enabled: bool) -> Self {
		self.lock().features.insert(feature, enabled);
		self
	}

	/// Feature whose control accepts clicks without changing state.
	pub fn with_stuck_feature(self, feature: Feature, enabled: bool) -> Self {
		{
			let mut state = self.lock();
			state.features.insert(feature, enabled);
			state.stuck.insert(feature);
		}
		self
	}

	/// Element queries fail with a driver error, as over a dead connection.
	pub fn with_disconnected(self, message: &str) -> Self {
		self.lock().disconnected = Some(message.to_string());
		self
	}

	/// A reply block already on screen before any submission.
	pub fn with_existing_reply(self, text: &str) -> Self {
		self.lock().blocks.push(text.to_string());
		self
	}

	pub fn with_reply(self, reply: ScriptedReply) -> Self {
		self.push_reply(reply);
		self
	}

	pub fn set_present(&self, selector: &str, present: bool) {
		let mut state = self.lock();
		if present {
			state.present.insert(selector.to_string());
		} else {
			state.present.remove(selector);
		}
	}

	pub fn push_reply(&self, reply: ScriptedReply) {
		self.lock().script.push_back(reply);
	}

	pub fn feature(&self, feature: Feature) -> Option<bool> {
		self.lock().features.get(&feature).copied()
	}

	pub fn actions(&self) -> Vec<Action> {
		self.lock().actions.clone()
	}

	/// Texts submitted so far, in order.
	pub fn submitted(&self) -> Vec<String> {
		let state = self.lock();
		let mut typed = HashMap::new();
		let mut out = Vec::new();
		for action in &state.actions {
			match action {
				Action::Type { target, text } => {
					typed.insert(target.clone(), text.clone());
				}
				Action::Submit { target } => {
					if let Some(text) = typed.remove(target) {
						out.push(text);
					}
				}
				_ => {}
			}
		}
		out
	}

	pub fn count(&self, wanted: &Action) -> usize {
		self.lock().actions.iter().filter(|action| *action == wanted).count()
	}

	fn lock(&self) -> MutexGuard<'_, FakeState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn record(&self, action: Action) {
		trace!(target = "lumo.fake", ?action, "action");
		self.lock().actions.push(action);
	}
}

#[async_trait]
impl RemoteView for FakeView {
	async fn focus(&self) -> Result<()> {
		self.record(Action::Focus);
		Ok(())
	}

	async fn locate(&self, selector: &str, wait: Duration) -> Result<Option<ElementHandle>> {
		if !self.exists(selector).await? && !wait.is_zero() {
			tokio::time::sleep(wait).await;
		}
		Ok(self
			.exists(selector)
			.await?
			.then(|| ElementHandle::new(format!("fake:{selector}"), selector)))
	}

	async fn exists(&self, selector: &str) -> Result<bool> {
		let state = self.lock();
		if let Some(message) = &state.disconnected {
			return Err(Error::View(message.clone()));
		}
		Ok(state.present.contains(selector))
	}

	async fn read_last_text(&self, _selector: &str) -> Result<Option<String>> {
		let mut state = self.lock();
		if let Some(chunk) = state.streaming.pop_front() {
			if let Some(last) = state.blocks.last_mut() {
				*last = chunk;
			}
		}
		Ok(state
			.blocks
			.iter()
			.rev()
			.map(|block| block.trim())
			.find(|block| !block.is_empty())
			.map(str::to_string))
	}

	async fn clear_and_type(&self, handle: &ElementHandle, text: &str) -> Result<()> {
		self.record(Action::Type {
			target: handle.label().to_string(),
			text: text.to_string(),
		});
		Ok(())
	}

	async fn submit(&self, handle: &ElementHandle) -> Result<()> {
		let next = self.lock().script.pop_front().unwrap_or(ScriptedReply::Silent);
		if let ScriptedReply::Fail(message) = next {
			return Err(Error::View(message));
		}
		self.record(Action::Submit {
			target: handle.label().to_string(),
		});

		let mut state = self.lock();
		match next {
			ScriptedReply::Text(text) => state.blocks.push(text),
			ScriptedReply::Streaming(chunks) => {
				state.blocks.push(String::new());
				state.streaming = chunks.into();
			}
			ScriptedReply::Silent | ScriptedReply::Fail(_) => {}
		}
		Ok(())
	}

	async fn click(&self, handle: &ElementHandle) -> Result<()> {
		let target = handle.label().to_string();
		{
			let mut state = self.lock();
			if let Some(revealed) = state.reveals.get(&target).cloned() {
				state.present.extend(revealed);
			}
		}
		self.record(Action::Click { target });
		Ok(())
	}

	async fn fill(&self, handle: &ElementHandle, value: &str) -> Result<()> {
		self.record(Action::Fill {
			target: handle.label().to_string(),
			value: value.to_string(),
		});
		Ok(())
	}

	async fn find_by_text(&self, selector: &str, text: &str) -> Result<Option<ElementHandle>> {
		let state = self.lock();
		Ok(state
			.texts
			.iter()
			.find(|(s, t)| s == selector && t.trim().eq_ignore_ascii_case(text.trim()))
			.map(|(_, t)| ElementHandle::new(format!("fake-text:{t}"), t.clone())))
	}

	async fn find_by_title(&self, selector: &str, title: &str) -> Result<Option<ElementHandle>> {
		let state = self.lock();
		Ok(state
			.titles
			.iter()
			.find(|(s, t)| s == selector && t == title)
			.map(|(_, t)| ElementHandle::new(format!("fake-title:{t}"), t.clone())))
	}

	async fn dismiss_overlays(&self) -> Result<()> {
		self.record(Action::Dismiss);
		Ok(())
	}

	async fn feature_state(&self, feature: Feature) -> Result<Option<bool>> {
		Ok(self.feature(feature))
	}

	async fn toggle_feature(&self, feature: Feature) -> Result<()> {
		{
			let mut state = self.lock();
			let stuck = state.stuck.contains(&feature);
			let Some(enabled) = state.features.get_mut(&feature) else {
				return Err(Error::ElementNotFound(format!("{feature} control")));
			};
			if !stuck {
				*enabled = !*enabled;
			}
		}
		self.record(Action::Toggle(feature));
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn submission_reveals_scripted_reply() {
		let view = FakeView::new()
			.with_present("input")
			.with_reply(ScriptedReply::text("hello"));
		let input = view.locate("input", Duration::ZERO).await.unwrap().unwrap();

		assert_eq!(view.read_last_text("reply").await.unwrap(), None);
		view.clear_and_type(&input, "hi").await.unwrap();
		view.submit(&input).await.unwrap();
		assert_eq!(view.read_last_text("reply").await.unwrap().as_deref(), Some("hello"));
		assert_eq!(view.submitted(), vec!["hi"]);
	}

	#[tokio::test]
	async fn streaming_reply_grows_per_read() {
		let view = FakeView::new().with_reply(ScriptedReply::Streaming(vec!["a".into(), "ab".into()]));
		let handle = ElementHandle::new("x", "input");
		view.submit(&handle).await.unwrap();

		assert_eq!(view.read_last_text("r").await.unwrap().as_deref(), Some("a"));
		assert_eq!(view.read_last_text("r").await.unwrap().as_deref(), Some("ab"));
		assert_eq!(view.read_last_text("r").await.unwrap().as_deref(), Some("ab"));
	}

	#[tokio::test]
	async fn click_reveals_configured_selectors() {
		let view = FakeView::new()
			.with_present("button.create")
			.with_reveal_on_click("button.create", &["#name"]);
		assert!(!view.exists("#name").await.unwrap());

		let button = view.locate("button.create", Duration::ZERO).await.unwrap().unwrap();
		view.click(&button).await.unwrap();
		assert!(view.exists("#name").await.unwrap());
	}

	#[tokio::test]
	async fn stuck_feature_ignores_toggle() {
		let view = FakeView::new().with_stuck_feature(Feature::GhostMode, false);
		view.toggle_feature(Feature::GhostMode).await.unwrap();
		assert_eq!(view.feature(Feature::GhostMode), Some(false));
		assert!(view.toggle_feature(Feature::WebSearch).await.is_err());
	}
}

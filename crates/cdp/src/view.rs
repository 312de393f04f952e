//! [`RemoteView`] over an attached Lumo tab.

use std::time::Duration;

use async_trait::async_trait;
use lumo::{ElementHandle, Feature, Layout, RemoteView};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::page::Page;

/// Path fragments of the ghost-mode icon in its two states.
const GHOST_ICON_DISABLED: &str = "M14.7497 9.25362L15.4433 9.50118L18.0931 7.79902";
const GHOST_ICON_ENABLED: &str = "M17.0185 11.5867C17.7224 11.6254";

const WEB_SEARCH_LABEL: &str = "Web search";

const LOCATE_POLL: Duration = Duration::from_millis(100);

fn quote(text: &str) -> String {
	// a JSON string literal is a valid JS string literal
	Value::from(text).to_string()
}

/// Live chat tab driven through CDP.
pub struct LumoView {
	page: Page,
	layout: Layout,
	driver: Option<JoinHandle<()>>,
}

impl LumoView {
	pub fn new(page: Page, layout: Layout) -> Self {
		Self {
			page,
			layout,
			driver: None,
		}
	}

	/// Ties the connection's receive loop to this view; it is aborted on drop.
	pub fn with_driver(mut self, driver: JoinHandle<()>) -> Self {
		self.driver = Some(driver);
		self
	}

	pub fn page(&self) -> &Page {
		&self.page
	}

	async fn call(&self, handle: &ElementHandle, function: &str, args: &[Value]) -> lumo::Result<Value> {
		Ok(self.page.call_on(handle.id(), function, args).await?)
	}

	async fn handle(&self, expression: &str, label: &str) -> lumo::Result<Option<ElementHandle>> {
		Ok(self
			.page
			.evaluate_handle(expression)
			.await?
			.map(|id| ElementHandle::new(id, label)))
	}

	fn feature_probe(feature: Feature) -> String {
		match feature {
			Feature::WebSearch => format!(
				"(() => {{ const b = [...document.querySelectorAll('button')].find(b => b.innerText.trim() === {label}); \
				 return b ? b.classList.contains('is-active') : null; }})()",
				label = quote(WEB_SEARCH_LABEL),
			),
			Feature::GhostMode => format!(
				"(() => {{ const html = [...document.querySelectorAll('path')].map(p => p.outerHTML); \
				 if (html.some(h => h.includes({on}))) return true; \
				 if (html.some(h => h.includes({off}))) return false; return null; }})()",
				on = quote(GHOST_ICON_ENABLED),
				off = quote(GHOST_ICON_DISABLED),
			),
		}
	}

	fn feature_click(feature: Feature) -> String {
		match feature {
			Feature::WebSearch => format!(
				"(() => {{ const b = [...document.querySelectorAll('button')].find(b => b.innerText.trim() === {label}); \
				 if (!b) return false; b.click(); return true; }})()",
				label = quote(WEB_SEARCH_LABEL),
			),
			Feature::GhostMode => format!(
				"(() => {{ const p = [...document.querySelectorAll('path')].find(p => p.outerHTML.includes({on}) || p.outerHTML.includes({off})); \
				 const b = p && p.closest('button'); if (!b) return false; b.click(); return true; }})()",
				on = quote(GHOST_ICON_ENABLED),
				off = quote(GHOST_ICON_DISABLED),
			),
		}
	}
}

impl Drop for LumoView {
	fn drop(&mut self) {
		if let Some(driver) = self.driver.take() {
			driver.abort();
		}
	}
}

impl std::fmt::Debug for LumoView {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LumoView").field("target", &self.page.target_id()).finish_non_exhaustive()
	}
}

#[async_trait]
impl RemoteView for LumoView {
	async fn focus(&self) -> lumo::Result<()> {
		Ok(self.page.bring_to_front().await?)
	}

	async fn locate(&self, selector: &str, wait: Duration) -> lumo::Result<Option<ElementHandle>> {
		let expression = format!("document.querySelector({})", quote(selector));
		let deadline = Instant::now() + wait;
		loop {
			if let Some(handle) = self.handle(&expression, selector).await? {
				return Ok(Some(handle));
			}
			if Instant::now() >= deadline {
				trace!(target = "lumo.cdp", %selector, "not found");
				return Ok(None);
			}
			tokio::time::sleep(LOCATE_POLL).await;
		}
	}

	async fn exists(&self, selector: &str) -> lumo::Result<bool> {
		let value = self
			.page
			.evaluate(&format!("document.querySelector({}) !== null", quote(selector)))
			.await?;
		Ok(value.as_bool().unwrap_or(false))
	}

	async fn read_last_text(&self, selector: &str) -> lumo::Result<Option<String>> {
		let expression = format!(
			"(() => {{ const blocks = [...document.querySelectorAll({})].map(el => el.innerText.trim()).filter(t => t.length > 0); \
			 return blocks.length ? blocks[blocks.length - 1] : null; }})()",
			quote(selector)
		);
		let value = self.page.evaluate(&expression).await?;
		Ok(value.as_str().map(str::to_string))
	}

	async fn clear_and_type(&self, handle: &ElementHandle, text: &str) -> lumo::Result<()> {
		self.call(handle, "function() { this.focus(); this.textContent = ''; }", &[]).await?;
		self.page.insert_text(text).await?;
		debug!(target = "lumo.cdp", chars = text.len(), "text inserted");
		Ok(())
	}

	async fn submit(&self, handle: &ElementHandle) -> lumo::Result<()> {
		self.call(handle, "function() { this.focus(); }", &[]).await?;
		Ok(self.page.press_enter().await?)
	}

	async fn click(&self, handle: &ElementHandle) -> lumo::Result<()> {
		self.call(
			handle,
			"function() { this.scrollIntoView({ block: 'center' }); this.click(); }",
			&[],
		)
		.await?;
		Ok(())
	}

	async fn fill(&self, handle: &ElementHandle, value: &str) -> lumo::Result<()> {
		// the native setter keeps framework-controlled inputs in sync
		self.call(
			handle,
			"function(value) { \
			 const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(this), 'value').set; \
			 setter.call(this, value); \
			 this.dispatchEvent(new Event('input', { bubbles: true })); \
			 this.dispatchEvent(new Event('change', { bubbles: true })); }",
			&[json!(value)],
		)
		.await?;
		Ok(())
	}

	async fn find_by_text(&self, selector: &str, text: &str) -> lumo::Result<Option<ElementHandle>> {
		let expression = format!(
			"(() => {{ const wanted = {}.trim().toLowerCase(); \
			 const el = [...document.querySelectorAll({})].find(e => (e.textContent || '').trim().toLowerCase() === wanted); \
			 return el ? (el.closest('button, div[role=\"button\"], a') || el) : null; }})()",
			quote(text),
			quote(selector)
		);
		self.handle(&expression, text).await
	}

	async fn find_by_title(&self, selector: &str, title: &str) -> lumo::Result<Option<ElementHandle>> {
		let expression = format!(
			"(() => {{ const el = [...document.querySelectorAll({})].find(e => e.title === {}); \
			 return el ? (el.parentElement || el) : null; }})()",
			quote(selector),
			quote(title)
		);
		self.handle(&expression, title).await
	}

	async fn dismiss_overlays(&self) -> lumo::Result<()> {
		let expression = format!(
			"(() => {{ const cancel = [...document.querySelectorAll({})].find(b => (b.textContent || '').trim().toLowerCase() === {}); \
			 if (cancel) cancel.click(); \
			 document.dispatchEvent(new KeyboardEvent('keydown', {{ key: 'Escape', bubbles: true }})); \
			 if (document.activeElement) document.activeElement.blur(); }})()",
			quote(&self.layout.buttons),
			quote(&self.layout.cancel_label.to_lowercase())
		);
		self.page.evaluate(&expression).await?;
		Ok(())
	}

	async fn feature_state(&self, feature: Feature) -> lumo::Result<Option<bool>> {
		let value = self.page.evaluate(&Self::feature_probe(feature)).await?;
		Ok(value.as_bool())
	}

	async fn toggle_feature(&self, feature: Feature) -> lumo::Result<()> {
		let clicked = self.page.evaluate(&Self::feature_click(feature)).await?;
		if clicked.as_bool() != Some(true) {
			return Err(lumo::Error::ElementNotFound(format!("{feature} control")));
		}
		debug!(target = "lumo.cdp", %feature, "feature control clicked");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn quoting_escapes_selector_quotes() {
		assert_eq!(quote(r#"p[data-placeholder="Ask anything…"]"#), r#""p[data-placeholder=\"Ask anything…\"]""#);
	}

	#[test]
	fn ghost_probe_checks_enabled_icon_first() {
		let probe = LumoView::feature_probe(Feature::GhostMode);
		let on = probe.find(GHOST_ICON_ENABLED).unwrap();
		let off = probe.find(GHOST_ICON_DISABLED).unwrap();
		assert!(on < off);
	}
}

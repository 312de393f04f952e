//! Project and chat navigation workflows.
//!
//! Creating a project walks through a modal (open it, fill two fields,
//! submit). Interleaving two of these corrupts the modal, so the workflow
//! holds the session guard from the first click to the last.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{Layout, Timings};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::view::RemoteView;

/// Navigation workflows against the chat sidebar.
#[derive(Debug, Clone)]
pub struct Projects {
	session: Arc<Session>,
	layout: Layout,
	timings: Timings,
}

impl Projects {
	pub fn new(session: Arc<Session>, layout: Layout, timings: Timings) -> Self {
		Self { session, layout, timings }
	}

	/// Creates a project named `name` with optional custom instructions.
	///
	/// Fails with [`Error::Busy`] while another creation is in flight.
	pub async fn create_project(&self, name: &str, instructions: Option<&str>) -> Result<()> {
		self.session.ensure_authenticated()?;
		if name.trim().is_empty() {
			return Err(Error::InvalidInput("project name is required".into()));
		}

		let token = self.session.acquire("create-project")?;
		let result = self.run_create(name, instructions.unwrap_or_default()).await;

		if let Err(err) = &result {
			warn!(target = "lumo.project", error = %err, "project creation failed; dismissing modal");
			if let Err(cleanup) = self.session.view().dismiss_overlays().await {
				warn!(target = "lumo.project", error = %cleanup, "cleanup failed");
			}
		}
		token.release();

		if result.is_ok() {
			info!(target = "lumo.project", %name, "project created");
		}
		result
	}

	async fn run_create(&self, name: &str, instructions: &str) -> Result<()> {
		let view = self.session.view();
		view.focus().await?;
		view.dismiss_overlays().await?;
		debug!(target = "lumo.project", "overlays dismissed");
		self.pause().await;

		self.expand_sidebar(view).await?;

		let create = view
			.locate(&self.layout.project_create_button, self.timings.control_wait())
			.await?
			.ok_or_else(|| Error::ElementNotFound(self.layout.project_create_button.clone()))?;
		view.click(&create).await?;
		debug!(target = "lumo.project", "create button clicked");

		let name_field = view
			.locate(&self.layout.project_name_field, self.timings.control_wait())
			.await?
			.ok_or_else(|| Error::ElementNotFound(self.layout.project_name_field.clone()))?;
		let instructions_field = view
			.locate(&self.layout.project_instructions_field, self.timings.control_wait())
			.await?
			.ok_or_else(|| Error::ElementNotFound(self.layout.project_instructions_field.clone()))?;
		debug!(target = "lumo.project", "modal ready");

		view.fill(&name_field, name).await?;
		view.fill(&instructions_field, instructions).await?;

		let submit = view
			.find_by_text(&self.layout.buttons, &self.layout.create_project_label)
			.await?
			.ok_or_else(|| Error::ElementNotFound(format!("{} button", self.layout.create_project_label)))?;
		view.click(&submit).await?;
		self.pause().await;
		Ok(())
	}

	/// Opens the sidebar project whose title is exactly `name`.
	pub async fn open_project(&self, name: &str) -> Result<()> {
		self.session.ensure_authenticated()?;
		if name.trim().is_empty() {
			return Err(Error::InvalidInput("project name is required".into()));
		}

		let view = self.session.view();
		view.focus().await?;
		self.expand_sidebar(view).await?;

		let item = view
			.find_by_title(&self.layout.project_items, name)
			.await?
			.ok_or_else(|| Error::ElementNotFound(format!("project \"{name}\"")))?;
		view.click(&item).await?;
		self.pause().await;
		info!(target = "lumo.project", %name, "project opened");
		Ok(())
	}

	/// Starts a fresh chat from the sidebar.
	pub async fn start_new_chat(&self) -> Result<()> {
		self.session.ensure_authenticated()?;
		let view = self.session.view();
		view.focus().await?;

		let item = view
			.find_by_text(&self.layout.sidebar_labels, &self.layout.new_chat_label)
			.await?
			.ok_or_else(|| Error::ElementNotFound(format!("{} sidebar item", self.layout.new_chat_label)))?;
		view.click(&item).await?;
		self.pause().await;
		info!(target = "lumo.project", "new chat started");
		Ok(())
	}

	/// Clicks the collapsed "Projects" toggle if it is showing.
	async fn expand_sidebar(&self, view: &dyn RemoteView) -> Result<()> {
		if let Some(toggle) = view.locate(&self.layout.projects_sidebar_toggle, std::time::Duration::ZERO).await? {
			debug!(target = "lumo.project", "sidebar collapsed; expanding");
			view.click(&toggle).await?;
			self.pause().await;
		}
		Ok(())
	}

	async fn pause(&self) {
		tokio::time::sleep(self.timings.action_pause()).await;
	}
}

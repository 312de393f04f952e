//! Browser attachment for one invocation.

use std::sync::Arc;

use lumo::Session;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::Result;

/// An attached chat tab wrapped in a [`Session`].
#[derive(Debug)]
pub struct Connected {
	pub session: Arc<Session>,
	pub target_id: String,
}

/// Attaches to the configured browser and records whether the account is
/// already logged in.
pub async fn connect(settings: &Settings) -> Result<Connected> {
	info!(target = "lumo.cli", endpoint = %settings.endpoint, url = %settings.service_url, "attaching to browser");
	let view = lumo_cdp::attach(&settings.endpoint, &settings.service_url, settings.lumo.layout.clone()).await?;
	let target_id = view.page().target_id().to_string();

	let session = Arc::new(Session::new(Arc::new(view)));
	if !session.refresh_login(&settings.lumo.layout.account_marker).await? {
		warn!(target = "lumo.cli", "account marker not found; run `lumo login` first");
	}

	Ok(Connected { session, target_id })
}

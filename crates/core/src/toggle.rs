//! Idempotent feature toggles.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::session::Session;
use crate::view::Feature;

/// What [`set_feature`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
	pub feature: Feature,
	pub enabled: bool,
	/// `false` when the feature was already in the requested state.
	pub toggled: bool,
}

/// Brings `feature` to `enabled`, clicking only if it differs, then verifies.
pub async fn set_feature(session: &Session, feature: Feature, enabled: bool, settle: Duration) -> Result<ToggleOutcome> {
	session.ensure_authenticated()?;
	let view = session.view();
	view.focus().await?;

	let current = view
		.feature_state(feature)
		.await?
		.ok_or_else(|| Error::ElementNotFound(format!("{feature} control")))?;
	if current == enabled {
		info!(target = "lumo.toggle", %feature, enabled, "already in requested state");
		return Ok(ToggleOutcome {
			feature,
			enabled,
			toggled: false,
		});
	}

	view.toggle_feature(feature).await?;
	tokio::time::sleep(settle).await;

	// a control that disappears after the click counts as off
	let after = view.feature_state(feature).await?.unwrap_or(false);
	if after != enabled {
		return Err(Error::ToggleNotApplied { feature, enabled });
	}

	info!(target = "lumo.toggle", %feature, enabled, "feature toggled");
	Ok(ToggleOutcome {
		feature,
		enabled,
		toggled: true,
	})
}

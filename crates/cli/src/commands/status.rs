use serde::Serialize;

use super::CommandOutput;
use crate::config::Settings;
use crate::context::Connected;
use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
	pub authenticated: bool,
	pub target_id: String,
	pub service_url: String,
}

pub fn execute(connected: &Connected, settings: &Settings) -> Result<CommandOutput> {
	CommandOutput::new(&StatusData {
		authenticated: connected.session.is_authenticated(),
		target_id: connected.target_id.clone(),
		service_url: settings.service_url.clone(),
	})
}

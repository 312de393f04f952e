use std::sync::Arc;

use lumo::{Config, Session, TurnExecutor, strip_affordances};
use serde::Serialize;
use tracing::info;

use super::CommandOutput;
use crate::error::Result;
use crate::output::DiagnosticLevel;
use crate::relay::{RelayFormat, RelayRequest, fetch_message};

/// Printed in place of a reply when the relayed message gets none.
pub const NO_RESPONSE: &str = "no response detected";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayData {
	pub format: RelayFormat,
	pub message: String,
	pub response: Option<String>,
}

pub async fn execute(session: Arc<Session>, config: &Config, client: &reqwest::Client, url: &str) -> Result<CommandOutput> {
	let request = RelayRequest::parse(url)?;
	let message = fetch_message(client, &request).await?;
	forward(session, config, request.format, &message).await
}

/// Cleans `message` and sends it with the relay ceiling.
pub async fn forward(session: Arc<Session>, config: &Config, format: RelayFormat, message: &str) -> Result<CommandOutput> {
	let message = strip_affordances(message);
	info!(target = "lumo.relay", chars = message.len(), "forwarding relayed message");

	let executor = TurnExecutor::new(session, config.layout.clone(), config.timings.clone());
	let response = executor.send_turn_with_ceiling(&message, config.timings.relay_ceiling()).await?;

	let answered = response.is_some();
	let output = CommandOutput::new(&RelayData { format, message, response })?;
	Ok(if answered {
		output
	} else {
		output.with_diagnostic(DiagnosticLevel::Warning, NO_RESPONSE)
	})
}

use std::sync::Arc;

use lumo::{Config, Session, TurnExecutor};
use serde::Serialize;

use super::CommandOutput;
use crate::error::Result;
use crate::output::DiagnosticLevel;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendData {
	pub prompt: String,
	pub response: Option<String>,
}

pub async fn execute(session: Arc<Session>, config: &Config, prompt: &str) -> Result<CommandOutput> {
	let executor = TurnExecutor::new(session, config.layout.clone(), config.timings.clone());
	let response = executor.send_turn(prompt).await?;

	let settled = response.is_some();
	let output = CommandOutput::new(&SendData {
		prompt: prompt.to_string(),
		response,
	})?;
	Ok(if settled {
		output
	} else {
		output.with_diagnostic(DiagnosticLevel::Warning, "reply did not settle before the ceiling")
	})
}

use lumo::{Config, Feature, Session, set_feature};

use super::CommandOutput;
use crate::error::Result;
use crate::output::DiagnosticLevel;

pub async fn execute(session: &Session, config: &Config, feature: Feature, enabled: bool) -> Result<CommandOutput> {
	let outcome = set_feature(session, feature, enabled, config.timings.action_pause()).await?;
	let output = CommandOutput::new(&outcome)?;
	Ok(if outcome.toggled {
		output
	} else {
		let state = if enabled { "on" } else { "off" };
		output.with_diagnostic(DiagnosticLevel::Info, format!("{feature} already {state}"))
	})
}

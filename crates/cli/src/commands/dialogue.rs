use std::sync::Arc;

use lumo::{Config, DialogueOrchestrator, DialogueStatus, FollowUpGenerator, RandomSource, Session, ThreadRandom, TurnExecutor};
use tokio_util::sync::CancellationToken;

use super::CommandOutput;
use crate::error::Result;
use crate::output::DiagnosticLevel;

pub async fn execute(
	session: Arc<Session>,
	config: &Config,
	prompt: &str,
	max_turns: Option<u32>,
	cancel: &CancellationToken,
) -> Result<CommandOutput> {
	run(session, config, prompt, max_turns, Box::new(ThreadRandom), cancel).await
}

/// [`execute`] with an injected random source.
pub async fn run(
	session: Arc<Session>,
	config: &Config,
	prompt: &str,
	max_turns: Option<u32>,
	rng: Box<dyn RandomSource>,
	cancel: &CancellationToken,
) -> Result<CommandOutput> {
	let executor = TurnExecutor::new(session, config.layout.clone(), config.timings.clone());
	let mut orchestrator = DialogueOrchestrator::new(executor, FollowUpGenerator::new(rng), config.timings.turn_pause());

	let max_turns = max_turns.unwrap_or(config.dialogue.max_turns);
	let report = orchestrator.run(prompt, max_turns, cancel).await?;

	let mut output = CommandOutput::new(&report)?;
	if report.status == DialogueStatus::Cancelled {
		output = output.with_diagnostic(
			DiagnosticLevel::Info,
			format!("stopped after {} of {} turns", report.completed_turns, report.max_turns),
		);
	}
	for skipped in &report.skipped {
		output = output.with_diagnostic(DiagnosticLevel::Warning, format!("turn {} skipped: {}", skipped.index, skipped.error));
	}
	Ok(output)
}

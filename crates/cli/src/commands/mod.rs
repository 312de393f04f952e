//! Command implementations and dispatch.
//!
//! Each command takes an attached [`lumo::Session`] and returns a
//! [`CommandOutput`]; [`dispatch`] wraps it in the result envelope.

pub mod chat;
pub mod dialogue;
pub mod feature;
pub mod login;
pub mod project;
pub mod relay;
pub mod send;
pub mod status;

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{Cli, Commands, ProjectAction};
use crate::config::Settings;
use crate::context::connect;
use crate::error::{CliError, Result};
use crate::output::{DiagnosticLevel, OutputFormat, ResultBuilder, print_error_stderr, print_result};

/// Exit status after a second Ctrl-C (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Payload and diagnostics produced by a command.
#[derive(Debug)]
pub struct CommandOutput {
	pub data: Value,
	pub diagnostics: Vec<(DiagnosticLevel, String)>,
}

impl CommandOutput {
	pub fn new(data: &impl Serialize) -> Result<Self> {
		Ok(Self {
			data: serde_json::to_value(data)?,
			diagnostics: Vec::new(),
		})
	}

	pub fn with_diagnostic(mut self, level: DiagnosticLevel, message: impl Into<String>) -> Self {
		self.diagnostics.push((level, message.into()));
		self
	}
}

pub async fn dispatch(cli: Cli) -> Result<()> {
	let format = cli.format;
	let builder = ResultBuilder::<Value>::new(cli.command.name());

	let settings = match Settings::resolve(&cli) {
		Ok(settings) => settings,
		Err(err) => return fail(builder, err, format),
	};
	let builder = builder.config(settings.effective());

	match execute(cli.command, &settings).await {
		Ok(output) => {
			let mut builder = builder.data(output.data);
			for (level, message) in output.diagnostics {
				builder = builder.diagnostic(level, message);
			}
			print_result(&builder.build(), format);
			Ok(())
		}
		Err(err) => fail(builder, err, format),
	}
}

fn fail(builder: ResultBuilder<Value>, err: CliError, format: OutputFormat) -> Result<()> {
	let error = err.to_command_error();
	if format != OutputFormat::Text {
		print_error_stderr(&error);
	}
	print_result(&builder.command_error(error).build(), format);
	Err(err)
}

/// What a Ctrl-C during a dialogue does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
	/// First signal: finish the current turn, then stop.
	Stop,
	/// Repeated signal: quit without waiting for the reply.
	Exit,
}

pub fn on_interrupt(cancel: &CancellationToken) -> Interrupt {
	if cancel.is_cancelled() {
		return Interrupt::Exit;
	}
	cancel.cancel();
	Interrupt::Stop
}

async fn execute(command: Commands, settings: &Settings) -> Result<CommandOutput> {
	let config = &settings.lumo;
	let connected = connect(settings).await?;
	let session = connected.session.clone();

	match command {
		Commands::Login { timeout_ms } => login::execute(&session, config, timeout_ms).await,
		Commands::Send { prompt } => send::execute(session, config, &prompt).await,
		Commands::Dialogue { prompt, max_turns } => {
			let cancel = CancellationToken::new();
			let watcher = tokio::spawn({
				let cancel = cancel.clone();
				async move {
					while tokio::signal::ctrl_c().await.is_ok() {
						match on_interrupt(&cancel) {
							Interrupt::Stop => {
								info!(target = "lumo.cli", "interrupt received, stopping after the current turn (Ctrl-C again to quit)")
							}
							Interrupt::Exit => {
								warn!(target = "lumo.cli", "second interrupt, exiting");
								std::process::exit(INTERRUPTED_EXIT_CODE);
							}
						}
					}
				}
			});
			let result = dialogue::execute(session, config, &prompt, max_turns, &cancel).await;
			watcher.abort();
			result
		}
		Commands::Relay { url } => {
			let client = reqwest::Client::new();
			relay::execute(session, config, &client, &url).await
		}
		Commands::Project {
			action: ProjectAction::Create { name, instructions },
		} => project::create(session, config, &name, instructions.as_deref()).await,
		Commands::Project {
			action: ProjectAction::Open { name },
		} => project::open(session, config, &name).await,
		Commands::NewChat => chat::new_chat(session, config).await,
		Commands::WebSearch { state } => feature::execute(&session, config, lumo::Feature::WebSearch, state.enabled()).await,
		Commands::GhostMode { state } => feature::execute(&session, config, lumo::Feature::GhostMode, state.enabled()).await,
		Commands::Status => status::execute(&connected, settings),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn second_interrupt_exits() {
		let cancel = CancellationToken::new();

		assert_eq!(on_interrupt(&cancel), Interrupt::Stop);
		assert!(cancel.is_cancelled());
		assert_eq!(on_interrupt(&cancel), Interrupt::Exit);
		assert_eq!(on_interrupt(&cancel), Interrupt::Exit);
	}
}

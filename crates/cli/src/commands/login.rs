use std::time::Duration;

use lumo::{Config, Session};
use serde::Serialize;
use tokio::time::Instant;
use tracing::info;

use super::CommandOutput;
use crate::error::Result;
use crate::output::DiagnosticLevel;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
	pub authenticated: bool,
	pub waited_ms: u64,
}

/// Waits for the account marker, polling while the user logs in by hand.
pub async fn execute(session: &Session, config: &Config, timeout_ms: Option<u64>) -> Result<CommandOutput> {
	let timeout = timeout_ms.map(Duration::from_millis).unwrap_or_else(|| config.timings.login_timeout());
	let start = Instant::now();

	let already = session.is_authenticated();
	if !already {
		info!(
			target = "lumo.cli",
			timeout_secs = timeout.as_secs(),
			"log in to the chat tab in your browser; waiting for the account marker"
		);
		session
			.wait_for_login(&config.layout.account_marker, config.timings.login_poll(), timeout)
			.await?;
	}

	let waited_ms = start.elapsed().as_millis() as u64;
	let output = CommandOutput::new(&LoginData {
		authenticated: true,
		waited_ms,
	})?;
	Ok(if already {
		output.with_diagnostic(DiagnosticLevel::Info, "already logged in")
	} else {
		output.with_diagnostic(DiagnosticLevel::Info, format!("login detected after {waited_ms}ms"))
	})
}

//! The single logical session with the remote chat view.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::guard::{GuardToken, SessionGuard};
use crate::view::RemoteView;

/// Handle to the remote view plus its authentication and guard state.
///
/// Created once per process when the view becomes reachable and lives for
/// the rest of it. Components receive it explicitly (usually as
/// `Arc<Session>`).
pub struct Session {
	view: Arc<dyn RemoteView>,
	authenticated: AtomicBool,
	guard: SessionGuard,
}

impl Session {
	pub fn new(view: Arc<dyn RemoteView>) -> Self {
		Self {
			view,
			authenticated: AtomicBool::new(false),
			guard: SessionGuard::new(),
		}
	}

	pub fn view(&self) -> &dyn RemoteView {
		self.view.as_ref()
	}

	pub fn is_authenticated(&self) -> bool {
		self.authenticated.load(Ordering::Acquire)
	}

	pub fn mark_authenticated(&self, authenticated: bool) {
		self.authenticated.store(authenticated, Ordering::Release);
	}

	/// Fails with [`Error::NotAuthenticated`] until login has been detected.
	pub fn ensure_authenticated(&self) -> Result<()> {
		if self.is_authenticated() { Ok(()) } else { Err(Error::NotAuthenticated) }
	}

	/// Takes the session guard for a multi-step mutation.
	pub fn acquire(&self, operation: &'static str) -> Result<GuardToken> {
		self.guard.acquire(operation)
	}

	pub fn is_busy(&self) -> bool {
		self.guard.is_busy()
	}

	/// Checks `marker` once and records the result.
	pub async fn refresh_login(&self, marker: &str) -> Result<bool> {
		let present = self.view.exists(marker).await?;
		self.mark_authenticated(present);
		Ok(present)
	}

	/// Polls for `marker` every `poll` until it appears or `timeout` elapses.
	///
	/// Used right after attaching, while the user logs in by hand.
	pub async fn wait_for_login(&self, marker: &str, poll: Duration, timeout: Duration) -> Result<()> {
		let start = Instant::now();
		loop {
			match self.refresh_login(marker).await {
				Ok(true) => {
					info!(target = "lumo.session", "login detected");
					return Ok(());
				}
				Ok(false) => {}
				Err(err) => debug!(target = "lumo.session", error = %err, "login check failed"),
			}

			if start.elapsed() >= timeout {
				return Err(Error::Timeout {
					elapsed: start.elapsed(),
					condition: "login".into(),
				});
			}

			debug!(target = "lumo.session", "waiting for manual login");
			tokio::time::sleep(poll).await;
		}
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("authenticated", &self.is_authenticated())
			.field("busy", &self.is_busy())
			.finish_non_exhaustive()
	}
}

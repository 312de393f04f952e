//! Exclusive access to the single shared session.
//!
//! Multi-step mutations of the view (open modal, fill fields, submit) leave
//! it in a broken state if interleaved, so they run under a [`GuardToken`].
//! Acquisition never waits: a second caller gets [`Error::Busy`] at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::{Error, Result};

/// Non-queuing mutual exclusion flag.
#[derive(Debug, Clone, Default)]
pub struct SessionGuard {
	busy: Arc<AtomicBool>,
}

impl SessionGuard {
	pub fn new() -> Self {
		Self::default()
	}

	/// Takes the guard for `operation`, or fails with [`Error::Busy`].
	pub fn acquire(&self, operation: &'static str) -> Result<GuardToken> {
		if self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
			debug!(target = "lumo.guard", operation, "guard contention");
			return Err(Error::Busy);
		}
		debug!(target = "lumo.guard", operation, "guard acquired");
		Ok(GuardToken {
			busy: Arc::clone(&self.busy),
			operation,
		})
	}

	pub fn is_busy(&self) -> bool {
		self.busy.load(Ordering::Acquire)
	}
}

/// Proof of exclusive access; releases the guard when dropped.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct GuardToken {
	busy: Arc<AtomicBool>,
	operation: &'static str,
}

impl GuardToken {
	pub fn operation(&self) -> &'static str {
		self.operation
	}

	/// Releases the guard explicitly. Dropping the token has the same effect.
	pub fn release(self) {
		drop(self);
	}
}

impl Drop for GuardToken {
	fn drop(&mut self) {
		self.busy.store(false, Ordering::Release);
		debug!(target = "lumo.guard", operation = self.operation, "guard released");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn second_acquire_is_busy_until_release() {
		let guard = SessionGuard::new();
		let token = guard.acquire("create-project").unwrap();
		assert!(guard.is_busy());
		assert!(matches!(guard.acquire("create-project"), Err(Error::Busy)));

		token.release();
		assert!(!guard.is_busy());
		let again = guard.acquire("open-project").unwrap();
		assert_eq!(again.operation(), "open-project");
	}

	#[test]
	fn drop_releases_on_early_return() {
		fn failing_step(guard: &SessionGuard) -> Result<()> {
			let _token = guard.acquire("create-project")?;
			Err(Error::ElementNotFound("button.projects-create-button".into()))
		}

		let guard = SessionGuard::new();
		assert!(failing_step(&guard).is_err());
		assert!(!guard.is_busy());
	}

	#[test]
	fn clones_share_state() {
		let guard = SessionGuard::new();
		let other = guard.clone();
		let _token = guard.acquire("a").unwrap();
		assert!(matches!(other.acquire("b"), Err(Error::Busy)));
	}

	#[tokio::test]
	async fn released_when_task_panics() {
		let guard = SessionGuard::new();
		let inner = guard.clone();
		let handle = tokio::spawn(async move {
			let _token = inner.acquire("panicky").unwrap();
			panic!("boom");
		});
		assert!(handle.await.is_err());
		assert!(!guard.is_busy());
	}
}

//! Periodic snapshots of an externally mutated value.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// One observation of the sampled value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilitySample {
	pub value: Option<String>,
	pub observed_at: Instant,
}

/// Lazily reads a value through `accessor` every `interval` until `ceiling`
/// has elapsed since construction.
///
/// The sequence is finite and cannot be restarted: once [`Sampler::next`]
/// returns `None` it keeps returning `None`.
pub struct Sampler<F> {
	accessor: F,
	interval: Duration,
	deadline: Instant,
	next_due: Option<Instant>,
	exhausted: bool,
}

impl<F, Fut> Sampler<F>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Option<String>>,
{
	pub fn new(accessor: F, interval: Duration, ceiling: Duration) -> Self {
		Self {
			accessor,
			interval,
			deadline: Instant::now() + ceiling,
			next_due: None,
			exhausted: false,
		}
	}

	/// Instant after which no further samples are produced.
	pub fn deadline(&self) -> Instant {
		self.deadline
	}

	/// Waits for the next poll and reads the value.
	///
	/// The first sample is taken immediately.
	pub async fn next(&mut self) -> Option<StabilitySample> {
		if self.exhausted {
			return None;
		}

		if let Some(due) = self.next_due {
			if due >= self.deadline {
				self.exhausted = true;
				return None;
			}
			tokio::time::sleep_until(due).await;
		} else if Instant::now() >= self.deadline {
			self.exhausted = true;
			return None;
		}

		// a read still pending at the deadline ends the sequence
		let Ok(value) = tokio::time::timeout_at(self.deadline, (self.accessor)()).await else {
			self.exhausted = true;
			return None;
		};
		let observed_at = Instant::now();
		if observed_at > self.deadline {
			self.exhausted = true;
			return None;
		}

		self.next_due = Some(observed_at + self.interval);
		Some(StabilitySample { value, observed_at })
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	#[tokio::test(start_paused = true)]
	async fn samples_at_fixed_interval_until_ceiling() {
		let start = Instant::now();
		let mut sampler = Sampler::new(
			|| async { Some("x".to_string()) },
			Duration::from_millis(100),
			Duration::from_millis(350),
		);

		let mut offsets = Vec::new();
		while let Some(sample) = sampler.next().await {
			offsets.push(sample.observed_at.duration_since(start).as_millis());
		}

		assert_eq!(offsets, vec![0, 100, 200, 300]);
	}

	#[tokio::test(start_paused = true)]
	async fn exhausted_sampler_stays_exhausted() {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&calls);
		let mut sampler = Sampler::new(
			move || {
				counter.fetch_add(1, Ordering::SeqCst);
				async { None }
			},
			Duration::from_millis(50),
			Duration::from_millis(120),
		);

		while sampler.next().await.is_some() {}
		let seen = calls.load(Ordering::SeqCst);

		assert!(sampler.next().await.is_none());
		assert!(sampler.next().await.is_none());
		assert_eq!(calls.load(Ordering::SeqCst), seen);
		assert_eq!(seen, 3);
	}

	#[tokio::test(start_paused = true)]
	async fn stalled_read_ends_at_deadline() {
		let start = Instant::now();
		let mut sampler = Sampler::new(
			|| std::future::pending::<Option<String>>(),
			Duration::from_millis(100),
			Duration::from_secs(50),
		);

		assert!(sampler.next().await.is_none());
		assert_eq!(start.elapsed(), Duration::from_secs(50));
		assert!(sampler.next().await.is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn zero_ceiling_produces_nothing() {
		let mut sampler = Sampler::new(|| async { Some("x".to_string()) }, Duration::from_millis(10), Duration::ZERO);
		assert!(sampler.next().await.is_none());
	}
}

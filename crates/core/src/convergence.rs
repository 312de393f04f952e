//! Reply settlement detection.
//!
//! The chat service never signals that a reply is complete; it streams text
//! into the view and stops. A reply is accepted once it has differed from the
//! pre-submission baseline and then stayed byte-identical for the whole
//! settle window. Growth during streaming keeps resetting that window.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::Timings;
use crate::sampler::{Sampler, StabilitySample};

/// Terminal result of one detection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergenceResult {
	Settled(String),
	TimedOut,
}

impl ConvergenceResult {
	pub fn into_option(self) -> Option<String> {
		match self {
			ConvergenceResult::Settled(value) => Some(value),
			ConvergenceResult::TimedOut => None,
		}
	}
}

/// Per-sample verdict of [`Convergence::observe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
	/// Nothing new yet: absent, empty, or still equal to the baseline.
	NotUpdated,
	/// A new value appeared or the value changed; the settle window restarted.
	InFlux,
	/// The value held for the settle window.
	Settled(String),
}

/// Pure settle-window state machine, fed one sample at a time.
#[derive(Debug)]
pub struct Convergence {
	baseline: Option<String>,
	settle: Duration,
	last_seen: Option<(String, Instant)>,
}

impl Convergence {
	pub fn new(baseline: Option<String>, settle: Duration) -> Self {
		Self {
			baseline,
			settle,
			last_seen: None,
		}
	}

	pub fn observe(&mut self, sample: &StabilitySample) -> Observation {
		let Some(value) = sample.value.as_deref().filter(|v| !v.is_empty()) else {
			return Observation::NotUpdated;
		};

		if self.baseline.as_deref() == Some(value) {
			return Observation::NotUpdated;
		}

		match &self.last_seen {
			Some((seen, since)) if seen == value => {
				if sample.observed_at.saturating_duration_since(*since) >= self.settle {
					Observation::Settled(value.to_string())
				} else {
					Observation::InFlux
				}
			}
			_ => {
				self.last_seen = Some((value.to_string(), sample.observed_at));
				Observation::InFlux
			}
		}
	}
}

/// Drives a [`Sampler`] through a [`Convergence`] until settled or out of time.
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceDetector {
	pub interval: Duration,
	pub settle: Duration,
	pub ceiling: Duration,
}

impl ConvergenceDetector {
	pub fn new(interval: Duration, settle: Duration, ceiling: Duration) -> Self {
		Self {
			interval,
			settle,
			ceiling,
		}
	}

	pub fn from_timings(timings: &Timings) -> Self {
		Self::new(timings.poll_interval(), timings.settle(), timings.ceiling())
	}

	pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
		self.ceiling = ceiling;
		self
	}

	/// Samples `accessor` until its value settles away from `baseline`.
	pub async fn wait<F, Fut>(&self, baseline: Option<String>, accessor: F) -> ConvergenceResult
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Option<String>>,
	{
		let mut sampler = Sampler::new(accessor, self.interval, self.ceiling);
		let mut state = Convergence::new(baseline, self.settle);
		let mut polls = 0u32;

		while let Some(sample) = sampler.next().await {
			polls += 1;
			match state.observe(&sample) {
				Observation::Settled(value) => {
					debug!(target = "lumo.converge", polls, chars = value.len(), "reply settled");
					return ConvergenceResult::Settled(value);
				}
				Observation::InFlux => trace!(target = "lumo.converge", polls, "reply in flux"),
				Observation::NotUpdated => {}
			}
		}

		debug!(
			target = "lumo.converge",
			polls,
			ceiling_ms = self.ceiling.as_millis() as u64,
			"reply did not settle before ceiling"
		);
		ConvergenceResult::TimedOut
	}
}

impl Default for ConvergenceDetector {
	fn default() -> Self {
		Self::from_timings(&Timings::default())
	}
}

#[cfg(test)]
mod tests {
	use std::collections::VecDeque;
	use std::sync::{Arc, Mutex};

	use super::*;

	fn sample(value: Option<&str>, at: Instant) -> StabilitySample {
		StabilitySample {
			value: value.map(str::to_string),
			observed_at: at,
		}
	}

	/// Accessor replaying `script`; the last entry repeats forever.
	fn scripted(script: Vec<Option<&'static str>>) -> impl FnMut() -> std::future::Ready<Option<String>> {
		let queue = Arc::new(Mutex::new(VecDeque::from(script)));
		move || {
			let mut queue = queue.lock().unwrap();
			let value = if queue.len() > 1 { queue.pop_front().flatten() } else { queue.front().copied().flatten() };
			std::future::ready(value.map(str::to_string))
		}
	}

	#[test]
	fn baseline_echo_never_settles() {
		let t0 = Instant::now();
		let mut state = Convergence::new(Some("old".into()), Duration::from_millis(100));
		assert_eq!(state.observe(&sample(Some("old"), t0)), Observation::NotUpdated);
		assert_eq!(
			state.observe(&sample(Some("old"), t0 + Duration::from_secs(10))),
			Observation::NotUpdated
		);
	}

	#[test]
	fn empty_and_absent_values_are_not_updates() {
		let t0 = Instant::now();
		let mut state = Convergence::new(None, Duration::from_millis(100));
		assert_eq!(state.observe(&sample(None, t0)), Observation::NotUpdated);
		assert_eq!(state.observe(&sample(Some(""), t0)), Observation::NotUpdated);
	}

	#[test]
	fn change_restarts_settle_window() {
		let t0 = Instant::now();
		let ms = Duration::from_millis;
		let mut state = Convergence::new(None, ms(2000));

		assert_eq!(state.observe(&sample(Some("Par"), t0)), Observation::InFlux);
		assert_eq!(state.observe(&sample(Some("Paris"), t0 + ms(1500))), Observation::InFlux);
		assert_eq!(state.observe(&sample(Some("Paris"), t0 + ms(3000))), Observation::InFlux);
		assert_eq!(
			state.observe(&sample(Some("Paris"), t0 + ms(3500))),
			Observation::Settled("Paris".into())
		);
	}

	#[tokio::test(start_paused = true)]
	async fn held_value_settles_after_window() {
		let start = Instant::now();
		let detector = ConvergenceDetector::new(Duration::from_millis(150), Duration::from_millis(2000), Duration::from_millis(50_000));

		let result = detector.wait(None, scripted(vec![Some("Paris is the capital.")])).await;

		assert_eq!(result, ConvergenceResult::Settled("Paris is the capital.".into()));
		let elapsed = start.elapsed();
		assert!(elapsed >= Duration::from_millis(2000), "settled too early: {elapsed:?}");
		assert!(elapsed < Duration::from_millis(2200), "settled too late: {elapsed:?}");
	}

	#[tokio::test(start_paused = true)]
	async fn streaming_reply_settles_on_final_text() {
		let detector = ConvergenceDetector::new(Duration::from_millis(100), Duration::from_millis(500), Duration::from_secs(10));
		let script = vec![None, Some("The"), Some("The answer"), Some("The answer is 42."), Some("The answer is 42.")];

		let result = detector.wait(Some("previous reply".into()), scripted(script)).await;

		assert_eq!(result, ConvergenceResult::Settled("The answer is 42.".into()));
	}

	#[tokio::test(start_paused = true)]
	async fn ever_changing_value_times_out() {
		let counter = Arc::new(Mutex::new(0u32));
		let detector = ConvergenceDetector::new(Duration::from_millis(100), Duration::from_millis(300), Duration::from_secs(2));

		let result = detector
			.wait(None, move || {
				let mut n = counter.lock().unwrap();
				*n += 1;
				std::future::ready(Some(format!("chunk {}", *n)))
			})
			.await;

		assert_eq!(result, ConvergenceResult::TimedOut);
	}

	#[tokio::test(start_paused = true)]
	async fn unchanged_baseline_times_out() {
		let detector = ConvergenceDetector::new(Duration::from_millis(100), Duration::from_millis(300), Duration::from_secs(1));
		let result = detector.wait(Some("stale".into()), scripted(vec![Some("stale")])).await;
		assert_eq!(result.into_option(), None);
	}

	#[tokio::test(start_paused = true)]
	async fn read_that_never_returns_times_out_at_ceiling() {
		let detector = ConvergenceDetector::new(Duration::from_millis(150), Duration::from_secs(2), Duration::from_secs(50));
		let start = Instant::now();

		let result = detector.wait(None, || std::future::pending::<Option<String>>()).await;

		assert_eq!(result, ConvergenceResult::TimedOut);
		assert_eq!(start.elapsed(), Duration::from_secs(50));
	}
}

//! Autonomous multi-turn dialogues.
//!
//! A run submits the caller's opening prompt, then keeps generating follow-up
//! prompts from each reply until the turn cap or cancellation. Only the
//! opening turn is allowed to fail the run; later failures are recorded as
//! skipped turns and the run carries on.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::followup::{FollowUpGenerator, Move};
use crate::topic::{Topic, classify};
use crate::turn::TurnExecutor;

/// One recorded exchange. `response` is `None` only when the reply timed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
	pub index: u32,
	pub prompt: String,
	pub response: Option<String>,
}

/// A turn whose submission raised an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTurn {
	pub index: u32,
	pub prompt: String,
	pub error: String,
}

/// Outcome of a single non-opening turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
	Completed(Turn),
	Skipped(SkippedTurn),
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogueStatus {
	Completed,
	Cancelled,
}

/// Mutable state of one run.
#[derive(Debug, Clone)]
pub struct DialogueState {
	pub initial_prompt: String,
	pub turns: Vec<Turn>,
	pub skipped: Vec<SkippedTurn>,
	pub current_topic: Topic,
	pub active: bool,
	pub max_turns: u32,
	/// Most recent non-empty reply; timed-out turns keep the previous one.
	last_reply: String,
}

impl DialogueState {
	fn new(initial_prompt: &str, max_turns: u32) -> Self {
		Self {
			initial_prompt: initial_prompt.to_string(),
			turns: Vec::new(),
			skipped: Vec::new(),
			current_topic: Topic::General,
			active: true,
			max_turns,
			last_reply: String::new(),
		}
	}

	fn record(&mut self, outcome: TurnOutcome) {
		match outcome {
			TurnOutcome::Completed(turn) => {
				if let Some(reply) = &turn.response {
					self.last_reply = reply.clone();
					let topic = classify(reply);
					if topic != self.current_topic {
						info!(target = "lumo.dialogue", from = %self.current_topic, to = %topic, "topic changed");
						self.current_topic = topic;
					}
				}
				self.turns.push(turn);
			}
			TurnOutcome::Skipped(skipped) => self.skipped.push(skipped),
		}
	}
}

/// Final transcript of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueReport {
	pub initial_prompt: String,
	pub turns: Vec<Turn>,
	pub skipped: Vec<SkippedTurn>,
	pub final_topic: Topic,
	/// Turn indices processed, recorded or skipped.
	pub completed_turns: u32,
	pub max_turns: u32,
	pub status: DialogueStatus,
}

/// Drives a [`TurnExecutor`] through an open-ended exchange.
#[derive(Debug)]
pub struct DialogueOrchestrator {
	executor: TurnExecutor,
	generator: FollowUpGenerator,
	turn_pause: Duration,
}

impl DialogueOrchestrator {
	pub fn new(executor: TurnExecutor, generator: FollowUpGenerator, turn_pause: Duration) -> Self {
		Self {
			executor,
			generator,
			turn_pause,
		}
	}

	/// Runs a dialogue of at most `max_turns` turns.
	///
	/// Fails only when the opening turn errors or gets no reply. `cancel` is
	/// checked between turns, never while a reply is awaited.
	pub async fn run(&mut self, initial_prompt: &str, max_turns: u32, cancel: &CancellationToken) -> Result<DialogueReport> {
		if initial_prompt.trim().is_empty() {
			return Err(Error::InvalidInput("initial prompt is required".into()));
		}
		if max_turns == 0 {
			return Err(Error::InvalidInput("max turns must be at least 1".into()));
		}

		let mut state = DialogueState::new(initial_prompt, max_turns);
		info!(target = "lumo.dialogue", max_turns, "dialogue started");

		let opening = match self.executor.send_turn(initial_prompt).await {
			Ok(Some(reply)) => reply,
			Ok(None) => {
				error!(target = "lumo.dialogue", "opening turn got no reply");
				return Err(Error::NoInitialReply);
			}
			Err(err) => {
				error!(target = "lumo.dialogue", error = %err, "opening turn failed");
				return Err(err);
			}
		};
		state.record(TurnOutcome::Completed(Turn {
			index: 1,
			prompt: initial_prompt.to_string(),
			response: Some(opening),
		}));
		info!(target = "lumo.dialogue", topic = %state.current_topic, "opening topic");

		let mut index = 2;
		let mut status = DialogueStatus::Completed;
		while index <= max_turns {
			if self.pause_or_cancel(cancel).await {
				status = DialogueStatus::Cancelled;
				info!(target = "lumo.dialogue", turn = index, "dialogue cancelled");
				break;
			}

			let outcome = self.follow_up(index, &state).await;
			state.record(outcome);
			index += 1;
		}

		state.active = false;
		let completed_turns = index - 1;
		if status == DialogueStatus::Completed {
			info!(target = "lumo.dialogue", max_turns, "reached maximum turns");
		}

		Ok(DialogueReport {
			initial_prompt: state.initial_prompt,
			turns: state.turns,
			skipped: state.skipped,
			final_topic: state.current_topic,
			completed_turns,
			max_turns,
			status,
		})
	}

	async fn follow_up(&mut self, index: u32, state: &DialogueState) -> TurnOutcome {
		let (choice, prompt) = self.generator.next_prompt(index, state.current_topic, &state.last_reply);
		info!(
			target = "lumo.dialogue",
			turn = index,
			transition = (choice == Move::Transition),
			%prompt,
			"follow-up generated"
		);

		match self.executor.send_turn(&prompt).await {
			Ok(response) => TurnOutcome::Completed(Turn { index, prompt, response }),
			Err(err) => {
				warn!(target = "lumo.dialogue", turn = index, error = %err, "turn skipped");
				TurnOutcome::Skipped(SkippedTurn {
					index,
					prompt,
					error: err.to_string(),
				})
			}
		}
	}

	/// Sleeps the inter-turn pause; returns `true` if cancelled meanwhile.
	async fn pause_or_cancel(&self, cancel: &CancellationToken) -> bool {
		if cancel.is_cancelled() {
			return true;
		}
		tokio::select! {
			_ = cancel.cancelled() => true,
			_ = tokio::time::sleep(self.turn_pause) => cancel.is_cancelled(),
		}
	}
}

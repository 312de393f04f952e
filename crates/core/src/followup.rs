//! Follow-up prompt generation for autonomous dialogues.

use rand::Rng;

use crate::topic::{Topic, extract_keywords};

/// Source of uniform draws in `[0, 1)`.
///
/// Injected so tests can force the stay/transition branches and template
/// choices.
pub trait RandomSource: Send {
	fn next_f64(&mut self) -> f64;
}

/// Thread-local generator from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
	fn next_f64(&mut self) -> f64 {
		rand::thread_rng().r#gen::<f64>()
	}
}

impl<F> RandomSource for F
where
	F: FnMut() -> f64 + Send,
{
	fn next_f64(&mut self) -> f64 {
		self()
	}
}

/// Whether the next prompt continues the current topic or pivots away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
	Stay,
	Transition,
}

/// Transition every fourth turn, sometimes after turn five, or when replies
/// get short after turn three.
///
/// `draw` is only consulted past turn five.
pub fn choose_move(turn: u32, previous_reply: &str, draw: impl FnOnce() -> f64) -> Move {
	let short_reply = previous_reply.split_whitespace().count() < 15;
	if turn % 4 == 0 || (turn > 5 && draw() > 0.7) || (short_reply && turn > 3) {
		Move::Transition
	} else {
		Move::Stay
	}
}

/// Continuation templates. `{kw}`/`{kw2}` are the top keywords of the
/// previous reply; `{pick:a|b|c}` chooses one alternative at random.
fn continuations(topic: Topic) -> &'static [&'static str] {
	match topic {
		Topic::Weather => &[
			"What factors contribute to the {kw} patterns in this region?",
			"How does {kw} affect daily life here?",
			"Are there any interesting {kw}-related phenomena?",
		],
		Topic::Travel => &[
			"What makes {kw} special compared to other places?",
			"What are some hidden gems in or near {kw}?",
			"How has {kw} changed over time?",
		],
		Topic::Technology => &[
			"What are the latest developments in {kw}?",
			"How is {kw} impacting other industries?",
			"What challenges does {kw} currently face?",
		],
		Topic::Science => &[
			"What recent {kw} discoveries excite you?",
			"How does {kw} research benefit society?",
			"What are the biggest questions in {kw} today?",
		],
		Topic::History => &[
			"What lesser-known {kw} events are interesting?",
			"How does {kw} shape our present?",
			"What can we learn from {kw}?",
		],
		Topic::Culture => &[
			"What unique {kw} traditions exist?",
			"How has {kw} evolved over time?",
			"What are some famous figures in {kw}?",
		],
		Topic::Health => &[
			"What are the latest {kw} breakthroughs?",
			"How can we improve {kw} awareness?",
			"What are common misconceptions about {kw}?",
		],
		Topic::Food => &[
			"What traditional {kw} dishes are popular?",
			"How has {kw} culture influenced other cuisines?",
			"What are some unique {kw} ingredients?",
		],
		Topic::General => &[
			"Could you tell me more about that?",
			"What are the key aspects of this topic?",
			"How does this connect to other areas?",
			"How do {kw} and {kw2} relate to each other?",
		],
	}
}

fn pivots(topic: Topic) -> &'static [&'static str] {
	match topic {
		Topic::Weather => &[
			"Speaking of {kw}, do you have any favorite {pick:books|movies|places} related to this?",
			"Does {kw} remind you of any interesting {pick:stories|experiences|events}?",
			"What's something completely different that you find fascinating?",
		],
		Topic::Travel => &[
			"Besides {kw}, what other destinations interest you?",
			"Do you have any hobbies unrelated to travel?",
			"What's a fascinating fact about something completely different?",
		],
		Topic::Technology => &[
			"Beyond technology, what other fields interest you?",
			"What's something in nature that amazes you?",
			"Do you have any favorite {pick:books|movies|art forms}?",
		],
		Topic::Science => &[
			"Outside of science, what captures your attention?",
			"What's a historical event that you find intriguing?",
			"Do you enjoy any creative activities like {pick:writing|painting|music}?",
		],
		Topic::History => &[
			"Moving beyond history, what modern topics interest you?",
			"What's something in the natural world that fascinates you?",
			"Do you have any favorite {pick:novels|films|artworks}?",
		],
		Topic::Culture => &[
			"Beyond cultural topics, what else do you enjoy learning about?",
			"What scientific discoveries do you find most interesting?",
			"Do you have any favorite places to visit or explore?",
		],
		Topic::Health => &[
			"Outside of health topics, what other subjects interest you?",
			"What technological advancements do you find most exciting?",
			"Do you have any favorite {pick:books|movies|hobbies}?",
		],
		Topic::Food => &[
			"Beyond food, what other topics do you enjoy discussing?",
			"What's something in nature that you find fascinating?",
			"Do you have any favorite {pick:historical|scientific|cultural} topics?",
		],
		Topic::General => &[
			"What's something completely different you'd like to talk about?",
			"Do you have any favorite {pick:books|movies|hobbies}?",
			"What's a fascinating fact about something unexpected?",
		],
	}
}

/// Picks an index in `0..len` from a uniform draw.
fn pick_index(len: usize, draw: f64) -> usize {
	((draw * len as f64) as usize).min(len.saturating_sub(1))
}

/// Builds follow-up prompts from the previous reply and the current topic.
pub struct FollowUpGenerator {
	rng: Box<dyn RandomSource>,
}

impl FollowUpGenerator {
	pub fn new(rng: Box<dyn RandomSource>) -> Self {
		Self { rng }
	}

	/// Returns the move taken and the rendered prompt for `turn`.
	pub fn next_prompt(&mut self, turn: u32, topic: Topic, previous_reply: &str) -> (Move, String) {
		let keywords = extract_keywords(previous_reply);
		let choice = choose_move(turn, previous_reply, || self.rng.next_f64());

		let templates = match choice {
			Move::Stay => continuations(topic),
			Move::Transition => pivots(topic),
		};
		let template = templates[pick_index(templates.len(), self.rng.next_f64())];
		(choice, self.render(template, &keywords))
	}

	fn render(&mut self, template: &str, keywords: &[String]) -> String {
		let first = keywords.first().map(String::as_str).unwrap_or("this");
		let second = keywords.get(1).map(String::as_str).unwrap_or(first);

		let mut out = String::with_capacity(template.len() + 16);
		let mut rest = template;
		while let Some(start) = rest.find('{') {
			out.push_str(&rest[..start]);
			let Some(len) = rest[start..].find('}') else {
				out.push_str(&rest[start..]);
				return out;
			};
			let token = &rest[start + 1..start + len];
			match token {
				"kw" => out.push_str(first),
				"kw2" => out.push_str(second),
				_ => match token.strip_prefix("pick:") {
					Some(options) => {
						let options: Vec<&str> = options.split('|').collect();
						out.push_str(options[pick_index(options.len(), self.rng.next_f64())]);
					}
					None => out.push_str(&rest[start..=start + len]),
				},
			}
			rest = &rest[start + len + 1..];
		}
		out.push_str(rest);
		out
	}
}

impl Default for FollowUpGenerator {
	fn default() -> Self {
		Self::new(Box::new(ThreadRandom))
	}
}

impl std::fmt::Debug for FollowUpGenerator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FollowUpGenerator").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const LONG_REPLY: &str = "Zurich is the largest city in Switzerland and a major centre for banking, culture, \
		research and travel with a beautiful old town beside the lake.";

	fn fixed(value: f64) -> Box<dyn RandomSource> {
		Box::new(move || value)
	}

	#[test]
	fn every_fourth_turn_transitions() {
		assert_eq!(choose_move(4, LONG_REPLY, || 0.0), Move::Transition);
		assert_eq!(choose_move(8, LONG_REPLY, || 0.0), Move::Transition);
		assert_eq!(choose_move(2, LONG_REPLY, || 0.0), Move::Stay);
	}

	#[test]
	fn random_draw_only_counts_after_turn_five() {
		assert_eq!(choose_move(5, LONG_REPLY, || 0.99), Move::Stay);
		assert_eq!(choose_move(6, LONG_REPLY, || 0.99), Move::Transition);
		assert_eq!(choose_move(6, LONG_REPLY, || 0.7), Move::Stay);
		assert_eq!(choose_move(3, LONG_REPLY, || panic!("draw consulted too early")), Move::Stay);
	}

	#[test]
	fn short_replies_transition_after_turn_three() {
		assert_eq!(choose_move(3, "Yes.", || 0.0), Move::Stay);
		assert_eq!(choose_move(5, "Yes, indeed.", || 0.0), Move::Transition);
	}

	#[test]
	fn stay_uses_topic_template_with_keyword() {
		let mut generator = FollowUpGenerator::new(fixed(0.0));
		let (choice, prompt) = generator.next_prompt(2, Topic::Travel, LONG_REPLY);
		assert_eq!(choice, Move::Stay);
		assert_eq!(prompt, "What makes zurich special compared to other places?");
	}

	#[test]
	fn transition_uses_pivot_template() {
		let mut generator = FollowUpGenerator::new(fixed(0.5));
		let (choice, prompt) = generator.next_prompt(4, Topic::Technology, LONG_REPLY);
		assert_eq!(choice, Move::Transition);
		assert_eq!(prompt, "What's something in nature that amazes you?");
	}

	#[test]
	fn pick_placeholder_chooses_alternative() {
		let mut generator = FollowUpGenerator::new(fixed(0.99));
		let (_, prompt) = generator.next_prompt(4, Topic::General, LONG_REPLY);
		assert_eq!(prompt, "What's a fascinating fact about something unexpected?");

		let mut draws = vec![0.4, 0.0].into_iter();
		let mut generator = FollowUpGenerator::new(Box::new(move || draws.next().unwrap_or(0.0)));
		let (_, prompt) = generator.next_prompt(4, Topic::General, LONG_REPLY);
		assert_eq!(prompt, "Do you have any favorite books?");
	}

	#[test]
	fn general_continuation_uses_both_keywords() {
		let mut generator = FollowUpGenerator::new(fixed(0.99));
		let (_, prompt) = generator.next_prompt(2, Topic::General, LONG_REPLY);
		assert_eq!(prompt, "How do zurich and largest relate to each other?");
	}

	#[test]
	fn missing_keywords_fall_back() {
		let mut generator = FollowUpGenerator::new(fixed(0.0));
		let (_, prompt) = generator.next_prompt(2, Topic::Health, "");
		assert_eq!(prompt, "What are the latest this breakthroughs?");
	}

	#[test]
	fn pick_index_clamps_upper_bound() {
		assert_eq!(pick_index(3, 0.999_999), 2);
		assert_eq!(pick_index(3, 1.0), 2);
		assert_eq!(pick_index(3, 0.0), 0);
	}
}

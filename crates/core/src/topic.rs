//! Coarse topic labels derived from reply text.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of keywords returned by [`extract_keywords`].
pub const KEYWORD_LIMIT: usize = 5;

const STOPWORDS: &[&str] = &[
	"the", "and", "a", "an", "in", "on", "at", "to", "for", "of", "with", "is", "are", "was", "were", "it", "that", "this", "these", "those",
	"be", "by", "as", "has", "have", "had", "over", "from", "but", "not", "or", "its", "can", "will", "you", "your", "they", "their", "there",
	"which", "what", "when", "also", "into", "about", "than", "then",
];

/// Topic categories, in matching priority order, plus the `General` fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
	Weather,
	Travel,
	Technology,
	Science,
	History,
	Culture,
	Health,
	Food,
	General,
}

impl Topic {
	/// Categories tried by [`categorize`]; the first overlap wins.
	pub const CATEGORIES: [Topic; 8] = [
		Topic::Weather,
		Topic::Travel,
		Topic::Technology,
		Topic::Science,
		Topic::History,
		Topic::Culture,
		Topic::Health,
		Topic::Food,
	];

	/// Signal words for this category. Empty for `General`.
	pub fn keywords(self) -> &'static [&'static str] {
		match self {
			Topic::Weather => &["weather", "temperature", "forecast", "rain", "snow", "storm"],
			Topic::Travel => &["zurich", "city", "location", "visit", "tourist", "travel", "destination"],
			Topic::Technology => &["computer", "software", "hardware", "code", "programming", "algorithm"],
			Topic::Science => &["research", "study", "experiment", "discovery", "scientific", "data"],
			Topic::History => &["historical", "past", "event", "war", "revolution", "period"],
			Topic::Culture => &["art", "music", "film", "literature", "tradition", "custom"],
			Topic::Health => &["medical", "doctor", "hospital", "disease", "treatment", "health"],
			Topic::Food => &["restaurant", "cooking", "recipe", "dish", "cuisine", "meal"],
			Topic::General => &[],
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Topic::Weather => "weather",
			Topic::Travel => "travel",
			Topic::Technology => "technology",
			Topic::Science => "science",
			Topic::History => "history",
			Topic::Culture => "culture",
			Topic::Health => "health",
			Topic::Food => "food",
			Topic::General => "general",
		}
	}
}

impl fmt::Display for Topic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Most frequent content words of `text`, at most [`KEYWORD_LIMIT`].
///
/// Tokens are lower-cased, stripped of punctuation and dropped when two
/// characters or shorter or a stopword. Ties keep first-occurrence order.
pub fn extract_keywords(text: &str) -> Vec<String> {
	let mut order: Vec<String> = Vec::new();
	let mut counts: HashMap<String, usize> = HashMap::new();

	for raw in text.to_lowercase().split_whitespace() {
		let word: String = raw.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect();
		if word.chars().count() <= 2 || STOPWORDS.contains(&word.as_str()) {
			continue;
		}
		let count = counts.entry(word.clone()).or_insert(0);
		if *count == 0 {
			order.push(word);
		}
		*count += 1;
	}

	let mut ranked: Vec<(String, usize)> = order
		.into_iter()
		.map(|word| {
			let count = counts[&word];
			(word, count)
		})
		.collect();
	// sort_by is stable: equal counts stay in first-occurrence order
	ranked.sort_by(|a, b| b.1.cmp(&a.1));
	ranked.into_iter().take(KEYWORD_LIMIT).map(|(word, _)| word).collect()
}

/// First category in [`Topic::CATEGORIES`] sharing a word with `keywords`.
pub fn categorize<S: AsRef<str>>(keywords: &[S]) -> Topic {
	Topic::CATEGORIES
		.into_iter()
		.find(|topic| keywords.iter().any(|k| topic.keywords().contains(&k.as_ref())))
		.unwrap_or(Topic::General)
}

/// Convenience: `categorize(&extract_keywords(text))`.
pub fn classify(text: &str) -> Topic {
	categorize(&extract_keywords(text))
}

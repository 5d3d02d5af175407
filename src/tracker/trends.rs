use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::Serialize;

use crate::models::analysis::OverallTone;
use crate::models::history::HistoryEntry;

/// Tokens shorter than this many characters are ignored by word frequency.
const MIN_WORD_CHARS: usize = 4;

const STOP_WORDS: &[&str] = &[
    "this", "that", "with", "have", "just", "your", "from", "about", "would", "could", "there",
    "their", "which", "been", "were", "what", "when", "where", "will", "they", "them", "then",
    "than", "because", "while", "should", "really", "very", "some", "more", "only", "also",
    "even", "much", "such", "like", "well", "still", "into", "over", "after", "before", "being",
    "most", "every", "other", "these", "those", "make", "made", "many", "back", "good", "time",
    "day", "days", "get", "got", "see", "one", "two", "three", "four", "five", "first", "last",
    "next", "now", "out", "off", "for", "and", "the", "you", "are", "but", "not", "all", "can",
    "was", "had", "did", "has", "too", "who", "why", "how", "his", "her", "him", "she", "our",
    "us", "we", "my", "me", "i", "to", "of", "in", "on", "at", "is", "it", "a", "an", "as", "by",
    "be", "or", "if", "so", "do", "no", "yes",
];

/// One point of the chronological mood series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodPoint {
    pub created_at: DateTime<Utc>,
    pub tone: OverallTone,
    pub ordinal: usize,
}

/// Everything the trends view shows, computed from one history snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub distribution: BTreeMap<OverallTone, usize>,
    pub series: Vec<MoodPoint>,
    /// Derived from history only, so it cannot exceed the history bound.
    /// The durable counter in [`crate::tracker::StreakTracker`] is the one to display.
    pub history_streak: u32,
    pub most_common_mood: Option<OverallTone>,
    pub word_frequency: HashMap<String, usize>,
}

/// Pure statistics over a history snapshot.
///
/// Calendar days are taken in `offset`, which is UTC unless the caller
/// supplies the user's offset.
#[derive(Debug, Clone, Copy)]
pub struct TrendAggregator {
    offset: FixedOffset,
}

impl Default for TrendAggregator {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl TrendAggregator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    fn calendar_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Entries per tone. The counts always sum to `entries.len()`.
    pub fn mood_distribution(&self, entries: &[HistoryEntry]) -> BTreeMap<OverallTone, usize> {
        let mut counts = BTreeMap::new();
        for entry in entries {
            *counts.entry(entry.analysis.overall_tone).or_insert(0) += 1;
        }
        counts
    }

    /// Ascending by `created_at`; equal instants keep their input order.
    pub fn mood_series(&self, entries: &[HistoryEntry]) -> Vec<MoodPoint> {
        let mut sorted: Vec<&HistoryEntry> = entries.iter().collect();
        sorted.sort_by_key(|entry| entry.created_at);

        sorted
            .into_iter()
            .map(|entry| MoodPoint {
                created_at: entry.created_at,
                tone: entry.analysis.overall_tone,
                ordinal: entry.analysis.overall_tone.ordinal(),
            })
            .collect()
    }

    /// Consecutive-day run ending at the most recent entry.
    ///
    /// Several entries on one day count as that day once; the walk stops at
    /// the first pair of days that are not exactly one day apart.
    pub fn streak(&self, entries: &[HistoryEntry]) -> u32 {
        let mut days: Vec<NaiveDate> = entries
            .iter()
            .map(|entry| self.calendar_day(entry.created_at))
            .collect();
        days.sort_unstable_by(|a, b| b.cmp(a));
        days.dedup();

        if days.is_empty() {
            return 0;
        }

        let mut streak = 1;
        for pair in days.windows(2) {
            if pair[1].succ_opt() == Some(pair[0]) {
                streak += 1;
            } else {
                break;
            }
        }
        streak
    }

    /// Lowercased whitespace tokens of at least four characters that are not
    /// stop words. Punctuation is kept as part of the token.
    pub fn word_frequency(&self, entries: &[HistoryEntry]) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for entry in entries {
            for token in entry.text.split_whitespace() {
                let word = token.to_lowercase();
                if word.chars().count() < MIN_WORD_CHARS || STOP_WORDS.contains(&word.as_str()) {
                    continue;
                }
                *counts.entry(word).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Highest count wins; ties go to the tone declared first.
    pub fn most_common_mood(&self, distribution: &BTreeMap<OverallTone, usize>) -> Option<OverallTone> {
        distribution
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(tone, _)| *tone)
    }

    /// Most frequent words first, ties alphabetical, at most `n`.
    pub fn top_words(&self, frequency: &HashMap<String, usize>, n: usize) -> Vec<(String, usize)> {
        let mut words: Vec<(String, usize)> = frequency
            .iter()
            .map(|(word, count)| (word.clone(), *count))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(n);
        words
    }

    pub fn report(&self, entries: &[HistoryEntry]) -> TrendReport {
        let distribution = self.mood_distribution(entries);
        let most_common_mood = self.most_common_mood(&distribution);

        TrendReport {
            series: self.mood_series(entries),
            history_streak: self.streak(entries),
            word_frequency: self.word_frequency(entries),
            most_common_mood,
            distribution,
        }
    }
}

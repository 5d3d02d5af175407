use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::{NoContext, Timestamp, Uuid};

use super::analysis::EmotionAnalysis;

/// Longest text accepted for analysis, in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// One analyzed text kept in the local recent-history cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub text: String,
    pub analysis: EmotionAnalysis,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// The id is a v7 UUID seeded from `created_at`, so ids sort by creation
    /// time and stay unique within the same millisecond.
    pub fn new(text: impl Into<String>, analysis: EmotionAnalysis, created_at: DateTime<Utc>) -> Self {
        let secs = u64::try_from(created_at.timestamp()).unwrap_or(0);
        let ts = Timestamp::from_unix(NoContext, secs, created_at.timestamp_subsec_nanos());

        Self {
            id: Uuid::new_v7(ts).to_string(),
            text: text.into(),
            analysis,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::analysis;
    use crate::models::analysis::OverallTone;
    use chrono::TimeZone;

    #[test]
    fn test_ids_are_unique_for_same_instant() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let a = HistoryEntry::new("first", analysis(OverallTone::Calm), at);
        let b = HistoryEntry::new("second", analysis(OverallTone::Calm), at);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_ids_sort_by_creation_time() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        let a = HistoryEntry::new("a", analysis(OverallTone::Sad), earlier);
        let b = HistoryEntry::new("b", analysis(OverallTone::Sad), later);
        assert!(a.id < b.id);
    }
}

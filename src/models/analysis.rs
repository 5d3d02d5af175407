use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall tone labels in their declared order. The order is stable and is
/// what trend series use as the y-axis ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OverallTone {
    Joyful,
    Calm,
    Anxious,
    Angry,
    Sad,
    Frustrated,
    Confused,
    Grateful,
    Excited,
    Neutral,
    Mixed,
}

impl OverallTone {
    pub const ALL: [OverallTone; 11] = [
        OverallTone::Joyful,
        OverallTone::Calm,
        OverallTone::Anxious,
        OverallTone::Angry,
        OverallTone::Sad,
        OverallTone::Frustrated,
        OverallTone::Confused,
        OverallTone::Grateful,
        OverallTone::Excited,
        OverallTone::Neutral,
        OverallTone::Mixed,
    ];

    /// Position of the label in [`OverallTone::ALL`].
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            OverallTone::Joyful => "Joyful",
            OverallTone::Calm => "Calm",
            OverallTone::Anxious => "Anxious",
            OverallTone::Angry => "Angry",
            OverallTone::Sad => "Sad",
            OverallTone::Frustrated => "Frustrated",
            OverallTone::Confused => "Confused",
            OverallTone::Grateful => "Grateful",
            OverallTone::Excited => "Excited",
            OverallTone::Neutral => "Neutral",
            OverallTone::Mixed => "Mixed",
        }
    }
}

impl fmt::Display for OverallTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tone label: {0}")]
pub struct UnknownTone(pub String);

impl FromStr for OverallTone {
    type Err = UnknownTone;

    /// Case-insensitive; language models are not consistent about casing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OverallTone::ALL
            .into_iter()
            .find(|tone| tone.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTone(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryEmotion {
    pub emotion: String,
    pub percentage: f64,
}

/// Structured result of one emotion analysis.
///
/// Percentages are expected to add up to 100 but nothing here enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAnalysis {
    pub overall_tone: OverallTone,
    pub primary_emotions: Vec<PrimaryEmotion>,
    pub cause_explanation: String,
    pub suggestion: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_follow_declared_order() {
        for (idx, tone) in OverallTone::ALL.iter().enumerate() {
            assert_eq!(tone.ordinal(), idx);
        }
        assert_eq!(OverallTone::Joyful.ordinal(), 0);
        assert_eq!(OverallTone::Mixed.ordinal(), 10);
    }

    #[test]
    fn test_tone_parse_ignores_case() {
        assert_eq!("grateful".parse::<OverallTone>().unwrap(), OverallTone::Grateful);
        assert_eq!(" SAD ".parse::<OverallTone>().unwrap(), OverallTone::Sad);
        assert!("Melancholic".parse::<OverallTone>().is_err());
    }

    #[test]
    fn test_analysis_uses_camel_case_keys() {
        let json = r#"{
            "overallTone": "Anxious",
            "primaryEmotions": [{"emotion": "Worry", "percentage": 70}, {"emotion": "Hope", "percentage": 30}],
            "causeExplanation": "An upcoming exam.",
            "suggestion": "Break revision into short sessions.",
            "timestamp": "2024-01-01T10:00:00Z"
        }"#;
        let analysis: EmotionAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.overall_tone, OverallTone::Anxious);
        assert_eq!(analysis.primary_emotions.len(), 2);
        assert_eq!(analysis.primary_emotions[0].percentage, 70.0);

        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["overallTone"], "Anxious");
        assert!(value.get("causeExplanation").is_some());
        assert!(value.get("cause_explanation").is_none());
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Durable `(count, lastDate)` pair behind the day-streak counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub count: u32,
    /// Calendar day of the last recorded analysis; `None` before the first one.
    #[serde(default)]
    pub last_date: Option<NaiveDate>,
}

/// Result of one streak update, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakUpdate {
    pub streak: u32,
    pub is_new_streak: bool,
}

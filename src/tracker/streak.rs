use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::streak::{StreakState, StreakUpdate};
use crate::store::KeyValueStore;

pub const STREAK_KEY: &str = "moodmirror_streak";

/// Pure streak transition for an analysis recorded on `today`.
///
/// - same day as `last_date`: unchanged, not a new streak
/// - the day after `last_date`: count + 1 (a new streak only if it was 0)
/// - anything else, or no prior day: count restarts at 1
///
/// A `today` earlier than `last_date` leaves the state unchanged so that
/// `last_date` never moves backwards.
pub fn advance(prior: StreakState, today: NaiveDate) -> (StreakState, StreakUpdate) {
    match prior.last_date {
        Some(last) if last >= today => (
            prior,
            StreakUpdate {
                streak: prior.count,
                is_new_streak: false,
            },
        ),
        Some(last) if today.pred_opt() == Some(last) => {
            let count = prior.count.saturating_add(1);
            (
                StreakState {
                    count,
                    last_date: Some(today),
                },
                StreakUpdate {
                    streak: count,
                    is_new_streak: count == 1,
                },
            )
        }
        _ => (
            StreakState {
                count: 1,
                last_date: Some(today),
            },
            StreakUpdate {
                streak: 1,
                is_new_streak: true,
            },
        ),
    }
}

/// Durable day-streak counter. `today` always comes from the caller.
#[derive(Clone)]
pub struct StreakTracker {
    store: Arc<dyn KeyValueStore>,
}

impl StreakTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored state, or the zero state if it is missing or unreadable.
    pub fn current(&self) -> StreakState {
        match self.store.get(STREAK_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored streak is corrupt, starting from zero");
                StreakState::default()
            }),
            Ok(None) => StreakState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load streak");
                StreakState::default()
            }
        }
    }

    /// Apply [`advance`] and persist the new state in a single `set`.
    pub fn update(&self, today: NaiveDate) -> StreakUpdate {
        let prior = self.current();
        let (next, outcome) = advance(prior, today);

        if next != prior {
            match serde_json::to_string(&next) {
                Ok(encoded) => {
                    if let Err(e) = self.store.set(STREAK_KEY, &encoded) {
                        tracing::warn!(error = %e, "Failed to persist streak");
                    }
                }
                Err(e) => tracing::error!(error = %e, "Failed to encode streak"),
            }
        }

        tracing::debug!(
            streak = outcome.streak,
            is_new_streak = outcome.is_new_streak,
            today = %today,
            "Streak updated"
        );
        outcome
    }
}

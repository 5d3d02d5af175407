//! Client-side state engine: the bounded history cache, the day-streak state
//! machine, the journal store with its calendar view, and trend aggregation.
//!
//! The components never call each other; the presentation layer
//! ([`crate::app::MoodMirror`], [`CalendarView`]) wires them together.

pub mod calendar;
pub mod history_cache;
pub mod journal_store;
pub mod streak;
pub mod trends;

pub use calendar::{CalendarError, CalendarView};
pub use history_cache::HistoryCache;
pub use journal_store::{JournalBackend, JournalError, JournalStore};
pub use streak::StreakTracker;
pub use trends::{MoodPoint, TrendAggregator, TrendReport};

pub mod analysis;
pub mod history;
pub mod journal;
pub mod streak;

pub mod journal_repo;
pub mod pool;

pub use journal_repo::{JournalRepository, MemoryJournalRepository, PgJournalRepository};
pub use pool::create_pool;

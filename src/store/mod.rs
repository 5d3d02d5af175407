//! Durable local key-value storage used by the history cache and the streak
//! tracker. Values are opaque strings (JSON in practice).

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous string store. Callers own the keys; implementations only
/// need `get`/`set`/`remove` with last-write-wins semantics.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value. A failed `set` must leave the previous value intact.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

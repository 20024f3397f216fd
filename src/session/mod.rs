//! Local session state
//!
//! The persona and generated content outlive a single command, so they are
//! kept in a small key/value store. Values are JSON under fixed keys.
//! `MemoryStore` backs tests and ephemeral runs; `RocksStore` keeps the
//! session on disk.

pub mod persona;
pub mod store;

pub use persona::{PersonaSession, StoredContent};
pub use store::{MemoryStore, RocksStore};

use thiserror::Error;

/// Selected entities of the current persona
pub const KEY_SELECTED_ENTITIES: &str = "selectedEntities";
/// Tags derived from the selected entities
pub const KEY_PERSONA_TAGS: &str = "personaTags";
/// Generated content, keyed by content kind
pub const KEY_GENERATED_CONTENT: &str = "generatedContent";

/// Where the user should be sent when session state is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Entity selection, the start of the persona flow
    EntitySelection,
}

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// RocksDB error
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Stored value is not valid JSON for its key
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Column family error
    #[error("Column family error: {0}")]
    ColumnFamily(String),

    /// A lock holder panicked
    #[error("Session store lock poisoned")]
    Poisoned,

    /// No persona has been built yet
    #[error("No persona in session")]
    NoPersona,
}

impl SessionError {
    /// Route that recovers from this error, if any
    pub fn redirect(&self) -> Option<Route> {
        match self {
            SessionError::NoPersona => Some(Route::EntitySelection),
            _ => None,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Minimal string key/value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> SessionResult<Option<String>>;

    fn put(&self, key: &str, value: &str) -> SessionResult<()>;

    fn delete(&self, key: &str) -> SessionResult<()>;

    fn keys(&self) -> SessionResult<Vec<String>>;

    /// Remove every key
    fn clear(&self) -> SessionResult<()> {
        for key in self.keys()? {
            self.delete(&key)?;
        }
        Ok(())
    }

    /// Make writes durable
    fn flush(&self) -> SessionResult<()> {
        Ok(())
    }
}

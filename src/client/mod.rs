//! # Database Client Port
//!
//! This is THE contract between the index facade and a database driver.
//! Three round-trips are all the facade ever needs: list, create, drop.
//!
//! ## Implementations
//!
//! | Client | Module | Description |
//! |--------|--------|-------------|
//! | `MemoryClient` | `memory` | In-memory reference client for testing/embedding |
//!
//! A driver adapter implements `IndexClient` by issuing `listIndexes`,
//! `createIndexes` and `dropIndexes` and translating driver failures into
//! `DriverError`, keeping the server's numeric error code.

pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{KeySequence, LiveIndex};

pub use memory::MemoryClient;

// ============================================================================
// Namespace
// ============================================================================

/// The (database, collection) pair a facade is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self { database: database.into(), collection: collection.into() }
    }
}

/// `database.collection`, the form the database uses in messages.
impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

// ============================================================================
// Index options
// ============================================================================

/// Options sent along with a key sequence when creating an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// `None` lets the database derive a name from the keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub unique: bool,
}

// ============================================================================
// Driver error
// ============================================================================

/// Server error codes that index commands report.
pub mod codes {
    pub const NAMESPACE_NOT_FOUND: i32 = 26;
    pub const INDEX_NOT_FOUND: i32 = 27;
    pub const CANNOT_CREATE_INDEX: i32 = 67;
    pub const INVALID_OPTIONS: i32 = 72;
    pub const INDEX_OPTIONS_CONFLICT: i32 = 85;
    pub const INDEX_KEY_SPECS_CONFLICT: i32 = 86;
}

/// A failure reported by the database or the driver.
///
/// `code` is the server's numeric error code when one exists; transport
/// failures usually carry none.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DriverError {
    pub code: Option<i32>,
    pub message: String,
}

impl DriverError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code: Some(code), message: message.into() }
    }

    pub fn uncoded(message: impl Into<String>) -> Self {
        Self { code: None, message: message.into() }
    }
}

// ============================================================================
// IndexClient Trait
// ============================================================================

/// The database-client capability consumed by `IndexOperations`.
///
/// Calls are synchronous round-trips. Implementations must be shareable
/// across threads; the facade borrows the client and never locks around it.
pub trait IndexClient: Send + Sync {
    /// All indexes on the collection, in the order the database lists them.
    /// An unknown collection has no indexes.
    fn list_indexes(&self, ns: &Namespace) -> Result<Vec<LiveIndex>, DriverError>;

    /// Create an index. Creating an index identical to an existing one
    /// (same name, keys and options) succeeds without changes.
    fn create_index(
        &self,
        ns: &Namespace,
        keys: &KeySequence,
        options: &IndexOptions,
    ) -> Result<(), DriverError>;

    /// Drop an index by name.
    fn drop_index(&self, ns: &Namespace, name: &str) -> Result<(), DriverError>;
}

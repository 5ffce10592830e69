//! # mongo-indexes: Content-Addressed Index Management
//!
//! Declare the secondary indexes a collection needs by *what they are*
//! (key sequence + uniqueness) instead of by name, then create, find and
//! delete them idempotently.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `IndexClient` is the contract between the facade and a database driver
//! 2. **Order is identity**: `{a: 1, b: 1}` and `{b: 1, a: 1}` are different indexes
//! 3. **Parser owns nothing**: definition text → `KeySequence` is a pure function
//! 4. **Typed conflicts**: driver error codes map to a small, closed `ErrorKind` set
//!
//! ## Quick Start
//!
//! ```rust
//! use mongo_indexes::{IndexOperations, IndexSpecification, MemoryClient};
//!
//! # fn example() -> mongo_indexes::Result<()> {
//! let client = MemoryClient::new();
//! let ops = IndexOperations::new("test", "randomData", &client);
//!
//! let spec = IndexSpecification::new()
//!     .with_name("by_flag_and_number")
//!     .with_definition("{ randomBoolean: 1, randomInt: 1 }");
//!
//! // Creates the index unless an equivalent one exists under any name.
//! ops.create_with_preferred_name(&spec)?;
//!
//! let found = ops.find(&IndexSpecification::new().with_name("by_flag_and_number"))?;
//! assert_eq!(
//!     found.and_then(|s| s.definition).as_deref(),
//!     Some(r#"{"randomBoolean": 1, "randomInt": 1}"#),
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Clients
//!
//! | Client | Module | Description |
//! |--------|--------|-------------|
//! | `MemoryClient` | `client::memory` | In-memory reference client for testing/embedding |
//! | (driver adapter) | - | Implement `IndexClient` over a real driver |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod definition;
pub mod matching;
pub mod client;
pub mod operations;
pub mod logging;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{Direction, IndexSpecification, KeySequence, LiveIndex};

// ============================================================================
// Re-exports: Client port
// ============================================================================

pub use client::{DriverError, IndexClient, IndexOptions, MemoryClient, Namespace};

// ============================================================================
// Re-exports: Facade
// ============================================================================

pub use matching::IndexMatcher;
pub use operations::IndexOperations;

// ============================================================================
// Error Types
// ============================================================================

/// The closed set of failure kinds callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An index with the same keys and options exists under another name.
    IndexExistsWithDifferentName,
    /// An index with the requested name exists with other keys or options.
    ExistingIndexHasSameName,
    /// The definition text could not be parsed, or is unusable for creation.
    InvalidDefinition,
    /// Any other failure reported by the database client.
    Driver,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{message}")]
    IndexExistsWithDifferentName { message: String },

    #[error("{message}")]
    ExistingIndexHasSameName { message: String },

    #[error("Invalid index definition at position {position}: {message}")]
    InvalidDefinition { position: usize, message: String },

    #[error("Driver error{}: {message}", code_suffix(.code))]
    Driver { code: Option<i32>, message: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IndexExistsWithDifferentName { .. } => ErrorKind::IndexExistsWithDifferentName,
            Error::ExistingIndexHasSameName { .. } => ErrorKind::ExistingIndexHasSameName,
            Error::InvalidDefinition { .. } => ErrorKind::InvalidDefinition,
            Error::Driver { .. } => ErrorKind::Driver,
        }
    }

    /// Driver error code, when the failure came from the database.
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::IndexExistsWithDifferentName { .. } => Some(client::codes::INDEX_OPTIONS_CONFLICT),
            Error::ExistingIndexHasSameName { .. } => Some(client::codes::INDEX_KEY_SPECS_CONFLICT),
            Error::InvalidDefinition { .. } => None,
            Error::Driver { code, .. } => *code,
        }
    }

    /// The database or parser message, without any prefix added by `Display`.
    pub fn message(&self) -> &str {
        match self {
            Error::IndexExistsWithDifferentName { message }
            | Error::ExistingIndexHasSameName { message }
            | Error::InvalidDefinition { message, .. }
            | Error::Driver { message, .. } => message,
        }
    }
}

fn code_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" (code {c})")).unwrap_or_default()
}

/// Unmapped passthrough. Typed conflicts are produced by `operations` only.
impl From<DriverError> for Error {
    fn from(err: DriverError) -> Self {
        Error::Driver { code: err.code, message: err.message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

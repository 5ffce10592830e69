//! # Index Operations
//!
//! The facade applications use. Scoped to one namespace, stateless between
//! calls: every operation re-reads the live indexes from the client.
//!
//! ```text
//! IndexSpecification ──compile──► IndexMatcher ──► list_indexes → first match
//!        │                                                  │
//!        └──parse definition──► create_index         drop_index(name)
//! ```
//!
//! Concurrent calls are not coordinated. Two `create` calls for the same
//! specification may race; the loser sees success or a typed conflict.
//! Callers that need exactly-once creation serialize externally.

use tracing::{debug, info, warn};

use crate::client::{codes, DriverError, IndexClient, IndexOptions, Namespace};
use crate::definition;
use crate::matching::IndexMatcher;
use crate::model::{IndexSpecification, LiveIndex};
use crate::{Error, ErrorKind, Result};

// ============================================================================
// Driver code mapping
// ============================================================================

/// Driver codes with a typed meaning. Everything else passes through as
/// `ErrorKind::Driver`. Swapping drivers means revisiting this table only.
const ERROR_CODE_TABLE: &[(i32, ErrorKind)] = &[
    (codes::INDEX_OPTIONS_CONFLICT, ErrorKind::IndexExistsWithDifferentName),
    (codes::INDEX_KEY_SPECS_CONFLICT, ErrorKind::ExistingIndexHasSameName),
];

/// Map a `create_index` failure onto the error taxonomy, keeping its message.
/// Listing and dropping pass driver failures through unmapped.
pub fn classify(err: DriverError) -> Error {
    let kind = err.code.and_then(|code| {
        ERROR_CODE_TABLE.iter().find(|(c, _)| *c == code).map(|(_, kind)| *kind)
    });
    match kind {
        Some(ErrorKind::IndexExistsWithDifferentName) => {
            Error::IndexExistsWithDifferentName { message: err.message }
        }
        Some(ErrorKind::ExistingIndexHasSameName) => {
            Error::ExistingIndexHasSameName { message: err.message }
        }
        _ => Error::from(err),
    }
}

// ============================================================================
// IndexOperations
// ============================================================================

/// Create, find and delete indexes of one collection by specification.
///
/// Borrows its client; the client must outlive the facade. The facade is
/// `Send + Sync` whenever the client is, which `IndexClient` requires.
pub struct IndexOperations<'c, C: IndexClient + ?Sized> {
    namespace: Namespace,
    client: &'c C,
}

impl<C: IndexClient + ?Sized> std::fmt::Debug for IndexOperations<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexOperations").field("namespace", &self.namespace).finish()
    }
}

impl<'c, C: IndexClient + ?Sized> IndexOperations<'c, C> {
    pub fn new(database: impl Into<String>, collection: impl Into<String>, client: &'c C) -> Self {
        Self::for_namespace(Namespace::new(database, collection), client)
    }

    pub fn for_namespace(namespace: Namespace, client: &'c C) -> Self {
        Self { namespace, client }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Create the index described by `spec`.
    ///
    /// Requires a non-empty definition. Re-creating an identical index is a
    /// no-op; the database decides, no extra checks are added here.
    ///
    /// # Errors
    ///
    /// - `InvalidDefinition` when the definition is missing, empty or malformed
    /// - `IndexExistsWithDifferentName` when the keys already carry another name
    /// - `ExistingIndexHasSameName` when the name is taken by other keys or options
    /// - `Driver` for anything else the client reports
    pub fn create(&self, spec: &IndexSpecification) -> Result<()> {
        info!(namespace = %self.namespace, ?spec, "creating index");

        let Some(text) = spec.definition.as_deref() else {
            return Err(Error::InvalidDefinition {
                position: 0,
                message: "A definition is required to create an index".into(),
            });
        };
        let keys = definition::parse(text)?;
        if keys.is_empty() {
            return Err(Error::InvalidDefinition {
                position: 0,
                message: "Cannot create an index without keys".into(),
            });
        }

        let options = IndexOptions {
            name: spec.name.clone(),
            unique: spec.is_unique(),
        };

        match self.client.create_index(&self.namespace, &keys, &options) {
            Ok(()) => {
                info!(namespace = %self.namespace, keys = %keys, "created index");
                Ok(())
            }
            Err(err) => {
                let err = classify(err);
                match err.kind() {
                    ErrorKind::IndexExistsWithDifferentName => {
                        warn!(namespace = %self.namespace, detail = err.message(), "index already exists with a different name");
                    }
                    ErrorKind::ExistingIndexHasSameName => {
                        warn!(namespace = %self.namespace, detail = err.message(), "index with requested name already exists");
                    }
                    _ => {}
                }
                Err(err)
            }
        }
    }

    /// Create the index unless one with the same content already exists,
    /// whatever its name.
    ///
    /// Lets rolling deployments converge on a preferred name without
    /// rebuilding an index an earlier release created under another name.
    /// If another writer creates the index between the lookup and the
    /// create, the typed conflict from `create` propagates.
    pub fn create_with_preferred_name(&self, spec: &IndexSpecification) -> Result<()> {
        if let Some(existing) = self.find(&spec.without_name())? {
            info!(namespace = %self.namespace, ?existing, "index matching specification already exists");
            return Ok(());
        }
        self.create(spec)
    }

    /// First index matching `spec`, projected back into a specification
    /// with a canonical definition. `None` when nothing matches.
    pub fn find(&self, spec: &IndexSpecification) -> Result<Option<IndexSpecification>> {
        info!(namespace = %self.namespace, ?spec, "searching index");

        let matcher = IndexMatcher::compile(spec)?;
        let indexes = self.list_live()?;

        match matcher.first_match(&indexes) {
            Some(index) => {
                info!(namespace = %self.namespace, index = %index.name, "found index");
                Ok(Some(index.to_specification()))
            }
            None => {
                info!(namespace = %self.namespace, ?spec, "no index found matching specification");
                Ok(None)
            }
        }
    }

    /// Drop the first index matching `spec`. No match is not an error.
    ///
    /// An unconstrained specification matches whichever index the database
    /// lists first. Matching the primary-key index forwards the drop
    /// anyway; the database's refusal surfaces as `Driver`.
    pub fn delete(&self, spec: &IndexSpecification) -> Result<()> {
        info!(namespace = %self.namespace, ?spec, "deleting index");

        let matcher = IndexMatcher::compile(spec)?;
        if matcher.is_unconstrained() {
            warn!(namespace = %self.namespace, "unconstrained specification drops the first listed index");
        }
        let indexes = self.list_live()?;

        let Some(index) = matcher.first_match(&indexes) else {
            info!(namespace = %self.namespace, ?spec, "no index found matching specification");
            return Ok(());
        };

        self.client
            .drop_index(&self.namespace, &index.name)
            .map_err(Error::from)?;
        info!(namespace = %self.namespace, index = %index.name, "deleted index");
        Ok(())
    }

    /// Every index on the collection, in listing order.
    pub fn list(&self) -> Result<Vec<IndexSpecification>> {
        Ok(self.list_live()?.iter().map(LiveIndex::to_specification).collect())
    }

    /// Apply `create_with_preferred_name` to each declaration in order.
    /// Stops at the first failure.
    pub fn ensure_all(&self, specs: &[IndexSpecification]) -> Result<()> {
        for spec in specs {
            self.create_with_preferred_name(spec)?;
        }
        info!(namespace = %self.namespace, count = specs.len(), "ensured indexes");
        Ok(())
    }

    fn list_live(&self) -> Result<Vec<LiveIndex>> {
        let indexes = self.client.list_indexes(&self.namespace).map_err(Error::from)?;
        debug!(namespace = %self.namespace, count = indexes.len(), "listed indexes");
        Ok(indexes)
    }
}

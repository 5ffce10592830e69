//! In-memory index client.
//!
//! This is the reference implementation of `IndexClient`. It keeps index
//! descriptors per namespace in a `HashMap` protected by an `RwLock` and
//! reproduces the observable rules the database applies to index commands.
//!
//! ## Behaviour
//!
//! - A collection comes into existence on its first `create_index` and starts
//!   with the primary-key index `_id_` on `{"_id": 1}`.
//! - Unnamed indexes get the database's default name: `field_direction`
//!   pairs joined by `_`, e.g. `first_1_second_-1`.
//! - Re-creating an identical index is a no-op.
//! - Same name with other keys or options fails with code 86; same keys
//!   under another name fails with code 85.
//! - `_id_` cannot be dropped (code 72); unknown names fail with code 27.
//!
//! ## Limitations
//!
//! - **No documents**: unique indexes are never checked against existing data.
//! - **No build phase**: indexes are ready the moment `create_index` returns.
//!
//! Use this client for:
//! - Testing code that manages indexes without a running database
//! - Embedding the facade where indexes are only bookkept

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::model::live::PRIMARY_INDEX_NAME;
use crate::model::{Direction, KeySequence, LiveIndex};
use super::codes;
use super::{DriverError, IndexClient, IndexOptions, Namespace};

// ============================================================================
// MemoryClient
// ============================================================================

/// In-memory index catalog. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryClient {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    /// namespace → indexes in creation order
    collections: RwLock<HashMap<Namespace, Vec<LiveIndex>>>,
    /// failure returned by the next port call, then cleared
    next_failure: Mutex<Option<DriverError>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor as-is, bypassing every create check. Creates the
    /// collection (with its `_id_` index) if needed. For fixtures that the
    /// index commands would refuse or reorder.
    pub fn seed(&self, ns: &Namespace, index: LiveIndex) {
        let mut collections = self.inner.collections.write();
        collection_entry(&mut collections, ns).push(index);
    }

    /// Make the next port call fail with `err`.
    pub fn fail_next(&self, err: DriverError) {
        *self.inner.next_failure.lock() = Some(err);
    }

    /// Namespaces that currently exist.
    pub fn namespaces(&self) -> Vec<Namespace> {
        let mut names: Vec<_> = self.inner.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn take_failure(&self) -> Result<(), DriverError> {
        match self.inner.next_failure.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for MemoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryClient")
            .field("namespaces", &self.inner.collections.read().len())
            .finish()
    }
}

fn collection_entry<'a>(
    collections: &'a mut HashMap<Namespace, Vec<LiveIndex>>,
    ns: &Namespace,
) -> &'a mut Vec<LiveIndex> {
    collections.entry(ns.clone()).or_insert_with(|| {
        vec![LiveIndex::new(PRIMARY_INDEX_NAME, KeySequence::new().with("_id", 1))]
    })
}

/// Name the database derives from a key pattern.
pub fn default_index_name(keys: &KeySequence) -> String {
    keys.iter()
        .map(|(field, dir)| format!("{field}_{dir}"))
        .collect::<Vec<_>>()
        .join("_")
}

fn validate_keys(keys: &KeySequence) -> Result<(), DriverError> {
    if keys.is_empty() {
        return Err(DriverError::new(codes::CANNOT_CREATE_INDEX, "Index keys cannot be empty."));
    }
    if keys.iter().any(|(_, dir)| *dir == Direction::Int(0)) {
        return Err(DriverError::new(
            codes::CANNOT_CREATE_INDEX,
            format!("Values in the index key pattern can't be 0: {keys}"),
        ));
    }
    Ok(())
}

fn describe(index: &LiveIndex) -> String {
    format!(
        "{{ key: {}, name: \"{}\"{} }}",
        index.key,
        index.name,
        if index.unique { ", unique: true" } else { "" },
    )
}

// ============================================================================
// IndexClient impl
// ============================================================================

impl IndexClient for MemoryClient {
    fn list_indexes(&self, ns: &Namespace) -> Result<Vec<LiveIndex>, DriverError> {
        self.take_failure()?;
        Ok(self.inner.collections.read().get(ns).cloned().unwrap_or_default())
    }

    fn create_index(
        &self,
        ns: &Namespace,
        keys: &KeySequence,
        options: &IndexOptions,
    ) -> Result<(), DriverError> {
        self.take_failure()?;
        validate_keys(keys)?;

        let name = match &options.name {
            Some(name) if name.is_empty() => {
                return Err(DriverError::new(codes::CANNOT_CREATE_INDEX, "Index name cannot be empty"));
            }
            Some(name) => name.clone(),
            None => default_index_name(keys),
        };
        let requested = LiveIndex::new(name, keys.clone()).unique(options.unique);

        let mut collections = self.inner.collections.write();
        let indexes = collection_entry(&mut collections, ns);

        if let Some(existing) = indexes.iter().find(|i| i.name == requested.name) {
            if *existing == requested {
                return Ok(());
            }
            return Err(DriverError::new(
                codes::INDEX_KEY_SPECS_CONFLICT,
                format!(
                    "An existing index has the same name as the requested index. \
                     Requested index: {}, existing index: {}",
                    describe(&requested),
                    describe(existing),
                ),
            ));
        }

        if let Some(existing) = indexes.iter().find(|i| i.key == requested.key) {
            return Err(DriverError::new(
                codes::INDEX_OPTIONS_CONFLICT,
                format!("Index already exists with a different name: {}", existing.name),
            ));
        }

        indexes.push(requested);
        Ok(())
    }

    fn drop_index(&self, ns: &Namespace, name: &str) -> Result<(), DriverError> {
        self.take_failure()?;

        let mut collections = self.inner.collections.write();
        let indexes = collections
            .get_mut(ns)
            .ok_or_else(|| DriverError::new(codes::NAMESPACE_NOT_FOUND, format!("ns not found: {ns}")))?;

        if name == PRIMARY_INDEX_NAME {
            return Err(DriverError::new(codes::INVALID_OPTIONS, "cannot drop _id index"));
        }

        let before = indexes.len();
        indexes.retain(|i| i.name != name);
        if indexes.len() == before {
            return Err(DriverError::new(
                codes::INDEX_NOT_FOUND,
                format!("index not found with name [{name}]"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns() -> Namespace {
        Namespace::new("mongo-index-test", "collection")
    }

    fn named(name: &str) -> IndexOptions {
        IndexOptions { name: Some(name.into()), unique: false }
    }

    fn names(db: &MemoryClient) -> Vec<String> {
        db.list_indexes(&ns()).unwrap().into_iter().map(|i| i.name).collect()
    }

    #[test]
    fn test_unknown_namespace_lists_nothing() {
        let db = MemoryClient::new();
        assert!(db.list_indexes(&ns()).unwrap().is_empty());
        assert!(db.namespaces().is_empty());
    }

    #[test]
    fn test_first_create_adds_primary_index() {
        let db = MemoryClient::new();
        let keys = KeySequence::new().with("first", 1).with("second", 1);
        db.create_index(&ns(), &keys, &named("name")).unwrap();

        assert_eq!(names(&db), vec!["_id_", "name"]);
        assert_eq!(db.namespaces(), vec![ns()]);
    }

    #[test]
    fn test_default_name() {
        let db = MemoryClient::new();
        let keys = KeySequence::new().with("first", 1).with("second", -1);
        db.create_index(&ns(), &keys, &IndexOptions::default()).unwrap();
        assert_eq!(names(&db), vec!["_id_", "first_1_second_-1"]);
        assert_eq!(default_index_name(&KeySequence::new().with("content", "text")), "content_text");
    }

    #[test]
    fn test_identical_create_is_noop() {
        let db = MemoryClient::new();
        let keys = KeySequence::new().with("a", 1);
        db.create_index(&ns(), &keys, &named("a")).unwrap();
        db.create_index(&ns(), &keys, &named("a")).unwrap();
        assert_eq!(names(&db), vec!["_id_", "a"]);
    }

    #[test]
    fn test_same_name_other_keys_is_86() {
        let db = MemoryClient::new();
        db.create_index(&ns(), &KeySequence::new().with("first", 1), &named("name")).unwrap();
        let err = db
            .create_index(&ns(), &KeySequence::new().with("second", 1), &named("name"))
            .unwrap_err();
        assert_eq!(err.code, Some(codes::INDEX_KEY_SPECS_CONFLICT));
        assert!(err.message.contains("same name"));
    }

    #[test]
    fn test_same_name_other_options_is_86() {
        let db = MemoryClient::new();
        let keys = KeySequence::new().with("a", 1);
        db.create_index(&ns(), &keys, &named("a")).unwrap();
        let unique = IndexOptions { name: Some("a".into()), unique: true };
        let err = db.create_index(&ns(), &keys, &unique).unwrap_err();
        assert_eq!(err.code, Some(codes::INDEX_KEY_SPECS_CONFLICT));
    }

    #[test]
    fn test_same_keys_other_name_is_85() {
        let db = MemoryClient::new();
        let keys = KeySequence::new().with("first", 1).with("second", 1);
        db.create_index(&ns(), &keys, &named("name")).unwrap();
        let err = db.create_index(&ns(), &keys, &named("other")).unwrap_err();
        assert_eq!(err.code, Some(codes::INDEX_OPTIONS_CONFLICT));
        assert_eq!(err.message, "Index already exists with a different name: name");
    }

    #[test]
    fn test_key_order_distinguishes_indexes() {
        let db = MemoryClient::new();
        db.create_index(&ns(), &KeySequence::new().with("a", 1).with("b", 1), &IndexOptions::default()).unwrap();
        db.create_index(&ns(), &KeySequence::new().with("b", 1).with("a", 1), &IndexOptions::default()).unwrap();
        assert_eq!(names(&db), vec!["_id_", "a_1_b_1", "b_1_a_1"]);
    }

    #[test]
    fn test_invalid_key_patterns() {
        let db = MemoryClient::new();
        let err = db.create_index(&ns(), &KeySequence::new(), &IndexOptions::default()).unwrap_err();
        assert_eq!(err.code, Some(codes::CANNOT_CREATE_INDEX));
        let err = db
            .create_index(&ns(), &KeySequence::new().with("a", 0), &IndexOptions::default())
            .unwrap_err();
        assert_eq!(err.code, Some(codes::CANNOT_CREATE_INDEX));
        assert!(db.namespaces().is_empty());
    }

    #[test]
    fn test_drop_rules() {
        let db = MemoryClient::new();
        let err = db.drop_index(&ns(), "a").unwrap_err();
        assert_eq!(err.code, Some(codes::NAMESPACE_NOT_FOUND));

        db.create_index(&ns(), &KeySequence::new().with("a", 1), &named("a")).unwrap();
        let err = db.drop_index(&ns(), "_id_").unwrap_err();
        assert_eq!(err.code, Some(codes::INVALID_OPTIONS));
        let err = db.drop_index(&ns(), "missing").unwrap_err();
        assert_eq!(err.code, Some(codes::INDEX_NOT_FOUND));

        db.drop_index(&ns(), "a").unwrap();
        assert_eq!(names(&db), vec!["_id_"]);
    }

    #[test]
    fn test_fail_next_applies_once() {
        let db = MemoryClient::new();
        db.fail_next(DriverError::new(13, "not authorized"));
        let err = db.list_indexes(&ns()).unwrap_err();
        assert_eq!(err.code, Some(13));
        assert!(db.list_indexes(&ns()).is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let db = MemoryClient::new();
        let other = db.clone();
        other.create_index(&ns(), &KeySequence::new().with("a", 1), &named("a")).unwrap();
        assert_eq!(names(&db), vec!["_id_", "a"]);
    }

    #[test]
    fn test_seed_bypasses_checks() {
        let db = MemoryClient::new();
        let keys = KeySequence::new().with("a", 1);
        db.seed(&ns(), LiveIndex::new("one", keys.clone()));
        db.seed(&ns(), LiveIndex::new("two", keys));
        assert_eq!(names(&db), vec!["_id_", "one", "two"]);
    }
}

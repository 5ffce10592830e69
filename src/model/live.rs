//! LiveIndex: an index as the database reports it.

use serde::{Deserialize, Serialize};

use super::{IndexSpecification, KeySequence};

/// Name the database gives the primary-key index of every collection.
pub const PRIMARY_INDEX_NAME: &str = "_id_";

/// Read-side view of an existing index.
///
/// Deserializes straight from a driver's index descriptor. Attributes the
/// facade does not use (`v`, `ns`, `sparse`, ...) are ignored, and `unique`
/// defaults to `false` when the descriptor omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveIndex {
    pub name: String,
    pub key: KeySequence,
    #[serde(default)]
    pub unique: bool,
}

impl LiveIndex {
    pub fn new(name: impl Into<String>, key: KeySequence) -> Self {
        Self { name: name.into(), key, unique: false }
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.name == PRIMARY_INDEX_NAME
    }

    /// Project back into a specification with a canonical definition.
    pub fn to_specification(&self) -> IndexSpecification {
        IndexSpecification {
            definition: Some(self.key.to_canonical()),
            name: Some(self.name.clone()),
            unique: Some(self.unique),
        }
    }
}

impl From<&LiveIndex> for IndexSpecification {
    fn from(index: &LiveIndex) -> Self {
        index.to_specification()
    }
}

//! IndexSpecification: a partial, content-based description of an index.

use serde::{Deserialize, Serialize};

/// Describes an index by any subset of key sequence, name and uniqueness.
///
/// Absent fields are wildcards when looking indexes up. A specification with
/// no fields at all matches every index, including the primary-key index;
/// `delete` on such a value drops whichever index the database lists first.
///
/// ```rust
/// use mongo_indexes::IndexSpecification;
///
/// let spec = IndexSpecification::new()
///     .with_definition("{ randomInt: 1, randomBoolean: 1 }")
///     .with_unique(true);
/// assert!(spec.is_unique());
/// assert_eq!(spec.name, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexSpecification {
    /// Key sequence in definition syntax, e.g. `{ first: 1, second: -1 }`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Only `Some(true)` constrains matching. `Some(false)` and `None` both
    /// accept unique and non-unique indexes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
}

impl IndexSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }

    /// Copy with `name` cleared. Used to look an index up by content only.
    pub fn without_name(&self) -> Self {
        Self { name: None, ..self.clone() }
    }

    pub fn is_unique(&self) -> bool {
        self.unique == Some(true)
    }
}

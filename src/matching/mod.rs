//! # Match Engine
//!
//! Decides whether a specification describes a live index.
//!
//! Rules, applied in order:
//!
//! 1. a named specification only matches an index with that exact name
//! 2. `unique: Some(true)` only matches unique indexes
//! 3. no definition (or an empty one) matches anything left
//! 4. otherwise the key sequences must be equal pair by pair, in order
//!
//! Directions are compared as parsed values. A live `"text"` or `"2dsphere"`
//! key only matches a definition naming the same kind.

use crate::definition;
use crate::model::{IndexSpecification, KeySequence, LiveIndex};
use crate::Result;

/// A specification compiled for repeated matching. The definition is parsed
/// once, up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMatcher {
    name: Option<String>,
    unique_only: bool,
    keys: Option<KeySequence>,
}

impl IndexMatcher {
    /// Compile a specification. Fails with `InvalidDefinition` when the
    /// definition does not parse.
    pub fn compile(spec: &IndexSpecification) -> Result<Self> {
        let keys = match spec.definition.as_deref() {
            Some(text) => Some(definition::parse(text)?).filter(|keys| !keys.is_empty()),
            None => None,
        };
        Ok(Self {
            name: spec.name.clone(),
            unique_only: spec.is_unique(),
            keys,
        })
    }

    /// True when nothing constrains matching. An empty `{}` definition
    /// counts as absent.
    pub fn is_unconstrained(&self) -> bool {
        self.name.is_none() && !self.unique_only && self.keys.is_none()
    }

    pub fn matches(&self, index: &LiveIndex) -> bool {
        if let Some(name) = &self.name {
            if *name != index.name {
                return false;
            }
        }

        if self.unique_only && !index.unique {
            return false;
        }

        match &self.keys {
            None => true,
            Some(keys) => same_key_sequence(keys, &index.key),
        }
    }

    /// First index in listing order that matches.
    pub fn first_match<'a, I>(&self, indexes: I) -> Option<&'a LiveIndex>
    where
        I: IntoIterator<Item = &'a LiveIndex>,
    {
        indexes.into_iter().find(|index| {
            let matched = self.matches(index);
            tracing::debug!(index = %index.name, matched, "matching index");
            matched
        })
    }
}

/// Pair-wise, order-sensitive comparison.
fn same_key_sequence(wanted: &KeySequence, live: &KeySequence) -> bool {
    wanted.len() == live.len()
        && wanted.iter().zip(live.iter()).all(|(a, b)| a == b)
}

/// One-shot form of [`IndexMatcher::matches`].
pub fn matches(spec: &IndexSpecification, index: &LiveIndex) -> Result<bool> {
    Ok(IndexMatcher::compile(spec)?.matches(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Error};

    fn live(name: &str, keys: &[(&str, i64)]) -> LiveIndex {
        LiveIndex::new(name, keys.iter().map(|(f, d)| (*f, *d)).collect())
    }

    fn spec() -> IndexSpecification {
        IndexSpecification::new()
    }

    #[test]
    fn test_name_must_match_when_given() {
        let index = live("name", &[("first", 1)]);
        assert!(matches(&spec().with_name("name"), &index).unwrap());
        assert!(!matches(&spec().with_name("other"), &index).unwrap());
    }

    #[test]
    fn test_unique_true_filters_non_unique() {
        let plain = live("a_1", &[("a", 1)]);
        let unique = live("a_1", &[("a", 1)]).unique(true);
        let wanted = spec().with_unique(true);
        assert!(!matches(&wanted, &plain).unwrap());
        assert!(matches(&wanted, &unique).unwrap());
    }

    #[test]
    fn test_unique_false_accepts_both() {
        let wanted = spec().with_definition("{ a: 1 }").with_unique(false);
        assert!(matches(&wanted, &live("a_1", &[("a", 1)])).unwrap());
        assert!(matches(&wanted, &live("a_1", &[("a", 1)]).unique(true)).unwrap());
    }

    #[test]
    fn test_definition_compares_in_order() {
        let ab = live("ab", &[("a", 1), ("b", 1)]);
        assert!(matches(&spec().with_definition("{ a: 1, b: 1 }"), &ab).unwrap());
        assert!(!matches(&spec().with_definition("{ b: 1, a: 1 }"), &ab).unwrap());
    }

    #[test]
    fn test_definition_prefix_is_not_a_match() {
        let ab = live("ab", &[("a", 1), ("b", 1)]);
        assert!(!matches(&spec().with_definition("{ a: 1 }"), &ab).unwrap());
        assert!(!matches(&spec().with_definition("{ a: 1, b: 1, c: 1 }"), &ab).unwrap());
    }

    #[test]
    fn test_direction_must_match() {
        let index = live("a_-1", &[("a", -1)]);
        assert!(!matches(&spec().with_definition("{ a: 1 }"), &index).unwrap());
        assert!(matches(&spec().with_definition("{ a: -1.0 }"), &index).unwrap());
    }

    #[test]
    fn test_unconstrained_matches_everything() {
        assert!(matches(&spec(), &live("_id_", &[("_id", 1)])).unwrap());
        assert!(matches(&spec().with_definition("{}"), &live("x", &[("x", 1)])).unwrap());
    }

    #[test]
    fn test_empty_definition_compiles_unconstrained() {
        assert!(IndexMatcher::compile(&spec()).unwrap().is_unconstrained());
        assert!(IndexMatcher::compile(&spec().with_definition("{}")).unwrap().is_unconstrained());
        assert!(IndexMatcher::compile(&spec().with_unique(false)).unwrap().is_unconstrained());
        assert!(!IndexMatcher::compile(&spec().with_unique(true)).unwrap().is_unconstrained());
        assert!(!IndexMatcher::compile(&spec().with_definition("{ a: 1 }")).unwrap().is_unconstrained());
    }

    #[test]
    fn test_fractional_live_direction_never_matches() {
        let index: LiveIndex = serde_json::from_str(r#"{"key": {"w": 0.5}, "name": "w"}"#).unwrap();
        assert!(!matches(&spec().with_definition("{ w: 1 }"), &index).unwrap());
        assert!(matches(&spec().with_name("w"), &index).unwrap());
    }

    #[test]
    fn test_named_kinds_never_equal_integers() {
        let text = LiveIndex::new("content_text", KeySequence::new().with("content", "text"));
        assert!(!matches(&spec().with_definition("{ content: 1 }"), &text).unwrap());
        assert!(matches(&spec().with_definition("{ content: 'text' }"), &text).unwrap());
        assert_eq!(text.key.get("content"), Some(&Direction::Named("text".into())));
    }

    #[test]
    fn test_invalid_definition_is_an_error() {
        let err = matches(&spec().with_definition("{ a: }"), &live("a", &[("a", 1)])).unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { .. }));
    }

    #[test]
    fn test_first_match_wins() {
        let indexes = vec![
            live("_id_", &[("_id", 1)]),
            live("first", &[("a", 1)]),
            live("second", &[("a", 1)]).unique(true),
        ];
        let matcher = IndexMatcher::compile(&spec().with_definition("{ a: 1 }")).unwrap();
        assert_eq!(matcher.first_match(&indexes).map(|i| i.name.as_str()), Some("first"));

        let matcher = IndexMatcher::compile(&spec()).unwrap();
        assert_eq!(matcher.first_match(&indexes).map(|i| i.name.as_str()), Some("_id_"));
    }
}

//! Key sequences: the ordered `(field, direction)` pairs that define an index.
//!
//! The database stores index keys as an ordered document, so a key sequence
//! is a vector of pairs, never a hash map. `{a: 1, b: 1}` and `{b: 1, a: 1}`
//! compare unequal.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

// ============================================================================
// Direction
// ============================================================================

/// Direction (or kind) of a single indexed field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Numeric direction. `1` ascending, `-1` descending.
    Int(i64),
    /// Special index kind reported by the database: `"text"`, `"hashed"`,
    /// `"2dsphere"`, ...
    Named(String),
    /// Fractional number reported by the database, kept in its decimal
    /// form. Never equal to a parsed definition.
    Number(String),
}

impl Direction {
    pub const ASCENDING: Direction = Direction::Int(1);
    pub const DESCENDING: Direction = Direction::Int(-1);
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Int(i) => write!(f, "{i}"),
            Direction::Named(s) | Direction::Number(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Direction {
    fn from(i: i64) -> Self { Direction::Int(i) }
}

impl From<i32> for Direction {
    fn from(i: i32) -> Self { Direction::Int(i as i64) }
}

impl From<&str> for Direction {
    fn from(s: &str) -> Self { Direction::Named(s.to_string()) }
}

impl From<String> for Direction {
    fn from(s: String) -> Self { Direction::Named(s) }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Direction::Int(i) => serializer.serialize_i64(*i),
            Direction::Named(s) => serializer.serialize_str(s),
            Direction::Number(s) => match s.parse::<f64>() {
                Ok(v) => serializer.serialize_f64(v),
                Err(_) => serializer.serialize_str(s),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DirectionVisitor)
    }
}

struct DirectionVisitor;

impl<'de> Visitor<'de> for DirectionVisitor {
    type Value = Direction;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an index direction (number or index kind string)")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Direction, E> {
        Ok(Direction::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Direction, E> {
        i64::try_from(v)
            .map(Direction::Int)
            .map_err(|_| E::custom(format!("index direction {v} out of range")))
    }

    /// Drivers report `1.0` for keys created from floating point documents.
    /// Integral values normalize to `Int`; other finite values never equal a
    /// parsed definition and are kept as `Number`.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Direction, E> {
        if !v.is_finite() {
            Ok(Direction::Named(v.to_string()))
        } else if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Ok(Direction::Int(v as i64))
        } else {
            Ok(Direction::Number(v.to_string()))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Direction, E> {
        Ok(Direction::Named(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Direction, E> {
        Ok(Direction::Named(v))
    }
}

// ============================================================================
// KeySequence
// ============================================================================

/// Ordered key pattern of an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySequence(SmallVec<[(String, Direction); 4]>);

impl KeySequence {
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Append a field. Existing fields with the same name are kept.
    pub fn push(&mut self, field: impl Into<String>, direction: impl Into<Direction>) {
        self.0.push((field.into(), direction.into()));
    }

    /// Chaining form of `push`.
    pub fn with(mut self, field: impl Into<String>, direction: impl Into<Direction>) -> Self {
        self.push(field, direction);
        self
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Direction)> {
        self.0.iter().map(|(field, dir)| (field.as_str(), dir))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(field, _)| field.as_str())
    }

    pub fn get(&self, field: &str) -> Option<&Direction> {
        self.0.iter().find(|(f, _)| f == field).map(|(_, dir)| dir)
    }

    /// Canonical string form: `{"first": 1, "second": -1}`.
    pub fn to_canonical(&self) -> String {
        crate::definition::to_canonical(self)
    }
}

/// Canonical form, see [`KeySequence::to_canonical`].
impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical())
    }
}

impl<K, D> FromIterator<(K, D)> for KeySequence
where
    K: Into<String>,
    D: Into<Direction>,
{
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, d)| (k.into(), d.into())).collect())
    }
}

impl<K, D> From<Vec<(K, D)>> for KeySequence
where
    K: Into<String>,
    D: Into<Direction>,
{
    fn from(pairs: Vec<(K, D)>) -> Self {
        pairs.into_iter().collect()
    }
}

/// Serializes as an ordered map, the shape drivers send on the wire.
impl Serialize for KeySequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, dir) in &self.0 {
            map.serialize_entry(field, dir)?;
        }
        map.end()
    }
}

/// Deserializes from a map, keeping entries in the order the format yields
/// them. Does not depend on an order-preserving map type.
impl<'de> Deserialize<'de> for KeySequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(KeySequenceVisitor)
    }
}

struct KeySequenceVisitor;

impl<'de> Visitor<'de> for KeySequenceVisitor {
    type Value = KeySequence;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an ordered map of field names to index directions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<KeySequence, A::Error> {
        let mut keys = KeySequence::new();
        while let Some((field, dir)) = access.next_entry::<String, Direction>()? {
            keys.push(field, dir);
        }
        Ok(keys)
    }
}

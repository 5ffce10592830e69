//! # Index Definitions
//!
//! The human-readable key-sequence syntax: `{ first: 1, second: -1 }`.
//! Pure functions with no client dependency.
//!
//! Parsing preserves field order. Serialization is canonical:
//! `{"first": 1, "second": -1}`, so a definition read back from the database
//! always renders the same way.

pub mod lexer;
pub mod parser;

use crate::model::{Direction, KeySequence};
use crate::Result;

/// Parse a definition string into an ordered key sequence.
pub fn parse(definition: &str) -> Result<KeySequence> {
    let tokens = lexer::tokenize(definition)?;
    parser::parse_definition(&tokens)
}

/// Serialize a key sequence in canonical form.
pub fn to_canonical(keys: &KeySequence) -> String {
    let entries: Vec<String> = keys
        .iter()
        .map(|(field, dir)| format!("{}: {}", quote(field), canonical_direction(dir)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Parse then re-serialize. Equal key sequences always normalize to the
/// same string, whatever quoting and spacing the input used.
pub fn normalize(definition: &str) -> Result<String> {
    parse(definition).map(|keys| to_canonical(&keys))
}

fn canonical_direction(dir: &Direction) -> String {
    match dir {
        Direction::Int(i) => i.to_string(),
        Direction::Named(s) => quote(s),
        Direction::Number(s) => s.clone(),
    }
}

/// JSON string quoting with escapes.
fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

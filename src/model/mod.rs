//! # Index Model
//!
//! Plain values that cross every boundary: caller ↔ facade ↔ client.
//!
//! No driver types here. Pure data, no I/O.

pub mod key;
pub mod live;
pub mod spec;

pub use key::{Direction, KeySequence};
pub use live::LiveIndex;
pub use spec::IndexSpecification;

//! `grocery-core` — value types shared by every layer of the staff directory.
//!
//! Nothing in here performs IO; paths and identifiers are plain values.

pub mod error;
pub mod id;
pub mod path;

pub use error::{DomainError, DomainResult, PathError};
pub use id::PersonId;
pub use path::NodePath;

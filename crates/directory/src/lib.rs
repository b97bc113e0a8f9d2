//! `grocery-directory` — the organization tree and the people assigned to it.
//!
//! - `node` / `person`: the stored entities
//! - `registry`: storage contracts plus in-memory and Postgres adapters
//! - `service`: the request pipeline (policy check, scope resolution, registry call)
//! - `seed`: deterministic demo data for dev and tests

pub mod node;
pub mod person;
pub mod registry;
pub mod seed;
pub mod service;

pub use node::Node;
pub use person::{NewPerson, Person, PersonChanges, PersonDraft, PersonPatch};
pub use registry::{
    InMemoryNodeRegistry, InMemoryPersonRegistry, NodeRegistry, PersonRegistry, RegistryError,
};
pub use service::{Endpoint, StaffError, StaffService};

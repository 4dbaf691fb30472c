//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (kindred-infra) implements. The core crate never depends on any
//! specific storage technology.

pub mod agent;
pub mod conversation;
pub mod user;

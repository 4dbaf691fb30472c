//! Business logic and repository trait definitions for Kindred.
//!
//! This crate defines the "ports" (repository traits, completion provider)
//! that the infrastructure layer implements, plus the chat pipeline built on
//! them. It depends only on `kindred-types` -- never on `kindred-infra` or
//! any database/IO crate.

pub mod chat;
pub mod compose;
pub mod emotion;
pub mod enhance;
pub mod llm;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

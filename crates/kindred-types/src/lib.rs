//! Shared domain types for Kindred.
//!
//! This crate contains the core domain types used across the Kindred platform:
//! Agent, UserProfile, Emotion, Conversation, Discoveries, LLM request shapes,
//! global configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod chat;
pub mod config;
pub mod discovery;
pub mod emotion;
pub mod error;
pub mod llm;
pub mod user;

//! Infrastructure layer for Kindred.
//!
//! Contains implementations of the ports defined in `kindred-core`:
//! SQLite storage, the Gemini / Ollama / OpenAI-compatible completion
//! providers, and the configuration loader.

pub mod config;
pub mod llm;
pub mod sqlite;

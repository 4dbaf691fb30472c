//! Keyword-based emotion tagging for inbound user messages.

pub mod tagger;

//! HTTP request handlers for the REST API.

pub mod admin;
pub mod agent;
pub mod auth;
pub mod chat;
pub mod profile;
pub mod stats;

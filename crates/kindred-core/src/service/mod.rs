//! Domain services orchestrating repositories.

pub mod agent;
pub mod catalogue;
pub mod user;

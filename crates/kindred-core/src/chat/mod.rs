//! Chat flow: tag, persist, compose, persist, reply.

pub mod service;

//! Interactive CLI chat with an agent.
//!
//! Implements the chat loop: a thinking spinner while the reply is composed,
//! markdown rendering, an emotion footer, discovery prompts and slash
//! commands. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;

//! Reply composition: turning a stored conversation, an agent persona and a
//! user profile into one outbound completion request, and parsing the
//! discovery side channel back out of the model's reply.

pub mod composer;
pub mod discovery;
pub mod params;
pub mod prompt;

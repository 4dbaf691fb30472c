//! Discovery block parser.
//!
//! Grammar of the side channel a model may append to its reply:
//!
//! ```text
//! reply     := visible [ block ]
//! block     := OPEN payload ( CLOSE | EOF )
//! OPEN      := ":::DISCOVERY:::"
//! CLOSE     := ":::"
//! payload   := JSON object { "interests"?: [string], "personalityTraits"?: [string] }
//! ```
//!
//! The first OPEN starts the block and the next CLOSE after it ends it.
//! Whatever sits between them is the payload. The whole block is removed
//! from the visible text whether or not the payload parses.

use kindred_types::chat::ComposedReply;
use kindred_types::discovery::Discoveries;

pub const DISCOVERY_OPEN: &str = ":::DISCOVERY:::";
pub const DISCOVERY_CLOSE: &str = ":::";

/// Split a raw completion into visible reply text and discoveries.
///
/// Without an opening delimiter the raw text is returned verbatim.
pub fn parse_reply(raw: &str) -> ComposedReply {
    let Some(start) = raw.find(DISCOVERY_OPEN) else {
        return ComposedReply {
            reply: raw.to_string(),
            discoveries: None,
        };
    };

    let payload_start = start + DISCOVERY_OPEN.len();
    let (payload, block_end) = match raw[payload_start..].find(DISCOVERY_CLOSE) {
        Some(offset) => {
            let close = payload_start + offset;
            (&raw[payload_start..close], close + DISCOVERY_CLOSE.len())
        }
        None => (&raw[payload_start..], raw.len()),
    };

    let discoveries = match parse_payload(payload) {
        Ok(found) => Some(found),
        Err(e) => {
            tracing::warn!(
                error = %e,
                payload_preview = &payload[..floor_char_boundary(payload, 200)],
                "Malformed discovery payload; dropping it"
            );
            None
        }
    };

    let before = raw[..start].trim_end();
    let after = raw[block_end..].trim();
    let reply = if after.is_empty() {
        before.to_string()
    } else {
        format!("{before}\n\n{after}")
    };

    ComposedReply { reply, discoveries }
}

/// The payload must be a JSON object, not an array.
fn parse_payload(payload: &str) -> Result<Discoveries, String> {
    let value: serde_json::Value =
        serde_json::from_str(payload.trim()).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("discovery payload is not a JSON object".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

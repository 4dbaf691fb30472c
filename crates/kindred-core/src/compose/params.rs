//! Generation parameter selection.

use kindred_types::agent::PreferredLength;
use kindred_types::emotion::Emotion;
use kindred_types::llm::GenerationParams;

/// Temperature for low-mood messages (sad, lonely).
pub const GENTLE_TEMPERATURE: f64 = 0.4;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const TOP_P: f64 = 0.9;

/// Output budget per length tier.
pub fn max_output_tokens(length: PreferredLength) -> u32 {
    match length {
        PreferredLength::Small => 512,
        PreferredLength::Medium => 2048,
        PreferredLength::Long => 8192,
    }
}

pub fn temperature_for(emotion: Emotion) -> f64 {
    match emotion {
        Emotion::Sad | Emotion::Lonely => GENTLE_TEMPERATURE,
        _ => DEFAULT_TEMPERATURE,
    }
}

/// Parameters for one composer call.
pub fn select(emotion: Emotion, length: PreferredLength) -> GenerationParams {
    GenerationParams {
        temperature: temperature_for(emotion),
        top_p: TOP_P,
        max_output_tokens: max_output_tokens(length),
    }
}

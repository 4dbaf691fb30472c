//! Emotion labels attached to every chat message.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed seven-label emotion vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Lonely,
    Angry,
    Anxious,
    Confused,
    #[default]
    Neutral,
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emotion::Happy => write!(f, "happy"),
            Emotion::Sad => write!(f, "sad"),
            Emotion::Lonely => write!(f, "lonely"),
            Emotion::Angry => write!(f, "angry"),
            Emotion::Anxious => write!(f, "anxious"),
            Emotion::Confused => write!(f, "confused"),
            Emotion::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "happy" => Ok(Emotion::Happy),
            "sad" => Ok(Emotion::Sad),
            "lonely" => Ok(Emotion::Lonely),
            "angry" => Ok(Emotion::Angry),
            "anxious" => Ok(Emotion::Anxious),
            "confused" => Ok(Emotion::Confused),
            "neutral" => Ok(Emotion::Neutral),
            other => Err(format!("invalid emotion: '{other}'")),
        }
    }
}

/// How strongly an emotion was signalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intensity::Low => write!(f, "low"),
            Intensity::Medium => write!(f, "medium"),
            Intensity::High => write!(f, "high"),
        }
    }
}

/// Result of tagging one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionReading {
    pub label: Emotion,
    pub confidence: f64,
    pub intensity: Intensity,
}

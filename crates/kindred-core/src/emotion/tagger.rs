//! Emotion tagger.
//!
//! Counts trigger substrings per category over the lower-cased text. Matching
//! is plain substring containment, so "unhappy" also counts toward `happy`.

use kindred_types::emotion::{Emotion, EmotionReading, Intensity};

/// Trigger substrings per category, in evaluation order.
const TRIGGERS: &[(Emotion, &[&str])] = &[
    (
        Emotion::Happy,
        &[
            "happy", "joy", "excited", "great", "awesome", "wonderful", "love", "amazing", "good",
            "glad",
        ],
    ),
    (
        Emotion::Sad,
        &[
            "sad",
            "unhappy",
            "depressed",
            "down",
            "miserable",
            "grief",
            "disappointed",
            "upset",
        ],
    ),
    (Emotion::Lonely, &["lonely", "alone", "isolated", "abandoned"]),
    (
        Emotion::Angry,
        &["angry", "mad", "furious", "annoyed", "irritated", "hate", "frustrated"],
    ),
    (
        Emotion::Anxious,
        &["anxious", "worried", "nervous", "stressed", "scared", "afraid", "fear"],
    ),
    (
        Emotion::Confused,
        &["confused", "unsure", "lost", "puzzled", "don't understand"],
    ),
];

const MATCHED_CONFIDENCE: f64 = 0.8;
const UNMATCHED_CONFIDENCE: f64 = 0.5;

/// Stateless keyword tagger.
pub struct EmotionTagger;

impl EmotionTagger {
    /// Tag a message. Never fails; empty or unmatched text is `neutral`.
    ///
    /// The winning category must have a strictly higher count than every
    /// other category. A tie for the top count resolves to `neutral`.
    pub fn tag(text: &str) -> EmotionReading {
        let lowered = text.to_lowercase();

        let counts: Vec<(Emotion, usize)> = TRIGGERS
            .iter()
            .map(|(label, words)| {
                let count = words.iter().filter(|w| lowered.contains(*w)).count();
                (*label, count)
            })
            .collect();

        let top = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let leaders: Vec<Emotion> = counts
            .iter()
            .filter(|(_, c)| top > 0 && *c == top)
            .map(|(label, _)| *label)
            .collect();

        let label = match leaders.as_slice() {
            [only] => *only,
            _ => Emotion::Neutral,
        };

        let confidence = if top > 0 {
            MATCHED_CONFIDENCE
        } else {
            UNMATCHED_CONFIDENCE
        };

        let intensity = if top > 2 {
            Intensity::High
        } else if top > 0 {
            Intensity::Medium
        } else {
            Intensity::Low
        };

        EmotionReading {
            label,
            confidence,
            intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_message() {
        let reading = EmotionTagger::tag("I am so happy and excited today");
        assert_eq!(reading.label, Emotion::Happy);
        assert_eq!(reading.intensity, Intensity::Medium);
        assert!((reading.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_message_is_neutral() {
        let reading = EmotionTagger::tag("");
        assert_eq!(reading.label, Emotion::Neutral);
        assert!((reading.confidence - 0.5).abs() < f64::EPSILON);
        assert_eq!(reading.intensity, Intensity::Low);
    }

    #[test]
    fn test_no_triggers_is_neutral() {
        let reading = EmotionTagger::tag("What time is the train to Leeds?");
        assert_eq!(reading.label, Emotion::Neutral);
        assert_eq!(reading.intensity, Intensity::Low);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(EmotionTagger::tag("I feel so LONELY").label, Emotion::Lonely);
    }

    #[test]
    fn test_high_intensity_above_two_matches() {
        let reading = EmotionTagger::tag("I'm worried, nervous and stressed about tomorrow");
        assert_eq!(reading.label, Emotion::Anxious);
        assert_eq!(reading.intensity, Intensity::High);
    }

    #[test]
    fn test_substring_matching() {
        // "hateful" contains "hate"
        assert_eq!(EmotionTagger::tag("such a hateful day").label, Emotion::Angry);
    }

    #[test]
    fn test_tie_resolves_to_neutral() {
        // "unhappy" hits both sad ("unhappy") and happy ("happy")
        let reading = EmotionTagger::tag("unhappy");
        assert_eq!(reading.label, Emotion::Neutral);
        assert!((reading.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_strict_majority_wins() {
        let reading = EmotionTagger::tag("I'm unhappy and miserable");
        assert_eq!(reading.label, Emotion::Sad);
    }

    #[test]
    fn test_deterministic() {
        let text = "I don't understand why I feel lost";
        assert_eq!(EmotionTagger::tag(text), EmotionTagger::tag(text));
        assert_eq!(EmotionTagger::tag(text).label, Emotion::Confused);
    }
}

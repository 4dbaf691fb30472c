//! Speculative user facts the model reports at the end of a reply.

use serde::{Deserialize, Serialize};

/// Payload of a discovery block.
///
/// The wire field names match the delimited JSON the model is instructed
/// to emit; either list may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discoveries {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, rename = "personalityTraits")]
    pub personality_traits: Vec<String>,
}

impl Discoveries {
    pub fn is_empty(&self) -> bool {
        self.interests.is_empty() && self.personality_traits.is_empty()
    }
}

/// How discovered facts are deduplicated against a profile's existing lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// "Reading" and "reading" are distinct entries.
    #[default]
    CaseSensitive,
    /// Entries compare case-insensitively; the first-seen spelling is kept.
    CaseInsensitive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discoveries_wire_names() {
        let json = r#"{"interests":["chess"],"personalityTraits":["curious"]}"#;
        let d: Discoveries = serde_json::from_str(json).unwrap();
        assert_eq!(d.interests, vec!["chess"]);
        assert_eq!(d.personality_traits, vec!["curious"]);

        let out = serde_json::to_string(&d).unwrap();
        assert!(out.contains("personalityTraits"));
    }

    #[test]
    fn test_discoveries_fields_optional() {
        let d: Discoveries = serde_json::from_str(r#"{"interests":["X"]}"#).unwrap();
        assert_eq!(d.interests, vec!["X"]);
        assert!(d.personality_traits.is_empty());

        let empty: Discoveries = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_merge_policy_default() {
        assert_eq!(MergePolicy::default(), MergePolicy::CaseSensitive);
    }
}

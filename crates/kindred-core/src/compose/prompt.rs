//! Context block builder.
//!
//! The context block is sent as the first user-role turn of every request.
//! Sections appear in a fixed order:
//!
//! ```text
//! SYSTEM INSTRUCTION: {persona}
//! FORMATTING RULES (CRITICAL): ...
//! USER EMOTIONAL CONTEXT: ...
//! USER PERSONALIZATION DATA: ...        (only with a profile)
//! RESPONSE LENGTH PREFERENCE: ...
//! BEHAVIORAL GUIDANCE: 1..8
//! SELF-DISCOVERY (CRITICAL): ...
//! ```

use kindred_types::agent::PreferredLength;
use kindred_types::emotion::Emotion;
use kindred_types::user::UserProfile;

use super::discovery::{DISCOVERY_CLOSE, DISCOVERY_OPEN};

/// Persona used when an agent's system prompt is blank.
pub const FALLBACK_PERSONA: &str = "You are a helpful, emotionally intelligent AI.";

const NOT_SPECIFIED: &str = "Not specified";

const FORMATTING_RULES: &str = "FORMATTING RULES (CRITICAL):
- Use multiple paragraphs. Never send a single block of text.
- Use newlines between different thoughts or sections.
- Use bullet points for lists to improve readability.
- Maintain a clean, spaced-out layout.
- FOR CODE: Always use Markdown code blocks (e.g., ```javascript```). Provide COMPLETE, functional examples when asked for code.";

/// Builds the context block for one turn.
pub struct ContextBlockBuilder;

impl ContextBlockBuilder {
    pub fn build(
        system_prompt: &str,
        emotion: Emotion,
        profile: Option<&UserProfile>,
        length: PreferredLength,
    ) -> String {
        let mut sections = Vec::with_capacity(7);

        let persona = system_prompt.trim();
        let persona = if persona.is_empty() {
            FALLBACK_PERSONA
        } else {
            persona
        };
        sections.push(format!("SYSTEM INSTRUCTION: {persona}"));

        sections.push(FORMATTING_RULES.to_string());

        let confidence = if emotion == Emotion::Neutral {
            "N/A"
        } else {
            "High"
        };
        sections.push(format!(
            "USER EMOTIONAL CONTEXT:\nThe user seems to be feeling: {emotion}.\nConfidence: {confidence}"
        ));

        if let Some(profile) = profile {
            sections.push(Self::personalization(profile));
        }

        sections.push(format!(
            "RESPONSE LENGTH PREFERENCE:\n\
             The user prefers a **{length}** response.\n\
             - Small: Very concise, direct, 1-2 short paragraphs or few bullet points.\n\
             - Medium: Balanced depth, 2-4 paragraphs.\n\
             - Long: Highly detailed, comprehensive, multi-paragraph or extensive bullet points."
        ));

        sections.push(Self::behavioral_guidance(length));
        sections.push(Self::self_discovery());

        sections.join("\n\n")
    }

    fn personalization(profile: &UserProfile) -> String {
        let name = profile.full_name.trim();
        let name = if name.is_empty() { "User" } else { name };
        let dob = profile
            .dob
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        format!(
            "USER PERSONALIZATION DATA:\n\
             - Name: {name}\n\
             - Date of Birth: {dob}\n\
             - Interests: {}\n\
             - Personality Traits: {}",
            join_or_unspecified(&profile.interests),
            join_or_unspecified(&profile.personality_traits),
        )
    }

    fn behavioral_guidance(length: PreferredLength) -> String {
        let directives = [
            "ADDRESS THE USER'S QUESTION/INPUT DIRECTLY AND RELEVANTLY.".to_string(),
            "If the user asks for code, technical solutions, or roadmaps, PRIORITIZE technical accuracy and directness over conversational filler. Give the code first if appropriate.".to_string(),
            "Maintain your core persona defined in the SYSTEM INSTRUCTION, but scale back \"mentoring\" talk if the user just wants the solution.".to_string(),
            "Adapt your tone based on the USER EMOTIONAL CONTEXT and USER PERSONALIZATION DATA.".to_string(),
            "Use the user's personalization data (Name, DOB, Interests, Traits) as a source of truth about the user. Reference these facts naturally during the conversation to build rapport.".to_string(),
            "Avoid clinical clichés or generic \"therapy talk\".".to_string(),
            "Be proactive in showing that you \"know\" and \"remember\" the user's details from their profile.".to_string(),
            format!("ADHERE TO THE RESPONSE LENGTH PREFERENCE: Provide a **{length}** response."),
        ];

        let mut out = String::from("BEHAVIORAL GUIDANCE:");
        for (i, directive) in directives.iter().enumerate() {
            out.push_str(&format!("\n{}. {directive}", i + 1));
        }
        out
    }

    fn self_discovery() -> String {
        format!(
            "SELF-DISCOVERY (CRITICAL):\n\
             If you identify NEW interests, hobbies, or personality traits that are NOT already in the USER PERSONALIZATION DATA, you MUST list them at the very end of your response in this EXACT format:\n\
             {DISCOVERY_OPEN}\n\
             {{\n  \"interests\": [\"new interest 1\", \"new interest 2\"],\n  \"personalityTraits\": [\"new trait 1\"]\n}}\n\
             {DISCOVERY_CLOSE}\n\
             Only include the block if you actually find new information."
        )
    }
}

fn join_or_unspecified(items: &[String]) -> String {
    if items.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        items.join(", ")
    }
}

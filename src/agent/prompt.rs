//! Conversation assembly for an intent.

use crate::llm::Conversation;

/// Build the two-turn conversation sent to the model.
///
/// Non-empty `reference_text` is appended verbatim to the instruction after a
/// blank line. The user prompt is passed through untouched.
pub fn build_conversation(
    instruction: &str,
    reference_text: Option<&str>,
    user_prompt: &str,
) -> Conversation {
    let system = match reference_text.filter(|r| !r.is_empty()) {
        Some(reference) => format!("{}\n\n{}", instruction, reference),
        None => instruction.to_string(),
    };

    Conversation::new(system, user_prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::INTENTS;

    #[test]
    fn user_prompt_is_verbatim() {
        let prompt = "  Où sont les salles informatiques ?\n<b>vite</b> ";
        let convo = build_conversation("Instruction.", None, prompt);
        assert_eq!(convo.user(), prompt);
        assert_eq!(convo.system(), "Instruction.");
    }

    #[test]
    fn reference_text_follows_instruction() {
        let convo = build_conversation("Instruction.", Some("Campus\n\nÀ Pessac."), "Bonjour");
        assert_eq!(convo.system(), "Instruction.\n\nCampus\n\nÀ Pessac.");
    }

    #[test]
    fn empty_reference_text_is_ignored() {
        let convo = build_conversation("Instruction.", Some(""), "Bonjour");
        assert_eq!(convo.system(), "Instruction.");
    }

    #[test]
    fn whitespace_reference_text_is_kept_verbatim() {
        let convo = build_conversation("Instruction.", Some("  \n"), "Bonjour");
        assert_eq!(convo.system(), "Instruction.\n\n  \n");
    }

    #[test]
    fn every_intent_system_turn_starts_with_its_instruction() {
        for profile in INTENTS.iter() {
            let convo = build_conversation(profile.instruction, Some("Doc"), "Bonjour");
            assert!(convo.system().starts_with(profile.instruction));
            assert_eq!(convo.messages().len(), 2);
        }
    }

    #[test]
    fn output_is_deterministic() {
        let a = build_conversation("I", Some("R"), "P");
        let b = build_conversation("I", Some("R"), "P");
        assert_eq!(a, b);
    }
}

//! System instruction for the language tutor

use crate::llm::config::Language;

/// Section markers the model is instructed to emit
pub mod markers {
    /// Opens the optional grammar-correction section
    pub const CORRECTION: &str = "[CORRECTION]";

    /// Opens the optional translation section
    pub const TRANSLATION: &str = "[TRANSLATION]";
}

/// Build the tutor system instruction for the given target language
///
/// The reply format it demands is what `parser::parse_reply` undoes:
/// main text, then optional `[CORRECTION]` and `[TRANSLATION]` sections.
pub fn build_system_instruction(language: Language) -> String {
    format!(
        r#"You are an expert language tutor helping a student learn {target}.

Your Responsibilities:
1. Engage in natural conversation.
2. If the user makes a grammar or vocabulary mistake, correct it politely.
3. Provide a translation of your response in {other} to help understanding.

Output Format (Strictly enforce this):
Your main response here...

{correction}
(Only if user made a mistake, explain briefly here)

{translation}
(The translation of your main response)"#,
        target = language.display_name(),
        other = language.other().display_name(),
        correction = markers::CORRECTION,
        translation = markers::TRANSLATION,
    )
}

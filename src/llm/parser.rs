//! Reply section parser
//!
//! Model replies follow the tutor protocol: main text, then an optional
//! `[CORRECTION]` section, then an optional `[TRANSLATION]` section.
//! The model does not always comply, so the parser accepts markers in
//! either order, missing markers, and marker-free replies.

use crate::llm::prompts::markers::{CORRECTION, TRANSLATION};

/// A model reply split into its protocol sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// Main utterance, stripped of section markers
    pub main: String,

    /// Grammar/vocabulary correction, if the model flagged one
    pub correction: Option<String>,

    /// Translation of the main text into the other language
    pub translation: Option<String>,
}

/// Split a raw model reply into main text, correction and translation
///
/// Main text is everything before the first marker of either kind.
/// Correction runs from `[CORRECTION]` to a following `[TRANSLATION]`
/// (or end of text); translation runs from `[TRANSLATION]` to end of
/// text. Sections that trim to nothing yield `None`. Only called on
/// non-empty reply text; an empty reply is a gateway failure upstream.
pub fn parse_reply(text: &str) -> ParsedReply {
    let correction_at = text.find(CORRECTION);
    let translation_at = text.find(TRANSLATION);

    let main_end = match (correction_at, translation_at) {
        (Some(c), Some(t)) => c.min(t),
        (Some(c), None) => c,
        (None, Some(t)) => t,
        (None, None) => text.len(),
    };
    let main = text[..main_end].trim().to_string();

    let correction = correction_at.and_then(|start| {
        let body_start = start + CORRECTION.len();
        // The terminating marker is the next one after the correction
        // body, which is not necessarily the first one in the reply
        let body_end = text[body_start..]
            .find(TRANSLATION)
            .map(|offset| body_start + offset)
            .unwrap_or(text.len());
        non_empty(&text[body_start..body_end])
    });

    let translation = translation_at
        .and_then(|start| non_empty(&text[start + TRANSLATION.len()..]));

    ParsedReply {
        main,
        correction,
        translation,
    }
}

fn non_empty(section: &str) -> Option<String> {
    let trimmed = section.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

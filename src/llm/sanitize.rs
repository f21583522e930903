//! Turn sanitization for the upstream model
//!
//! The upstream API strictly requires alternating user/model roles in
//! its contents array, but the persisted transcript does not enforce
//! alternation: retries, multi-part corrections or an interrupted
//! exchange can leave consecutive same-role turns in the log. Before
//! every request the trailing context window is folded into a strictly
//! alternating sequence by merging same-role runs.

use crate::transcript::{Role, Turn};

/// One logical turn sent to the upstream model
///
/// Ephemeral projection built fresh per request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedTurn {
    pub role: Role,
    pub text: String,
}

/// Tunables for building the outbound context window
#[derive(Clone, Debug)]
pub struct SanitizerConfig {
    /// How many trailing transcript turns to include
    pub window_turns: usize,

    /// Separator inserted between merged same-role turns
    pub merge_separator: String,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            window_turns: 20,
            merge_separator: "\n".to_string(),
        }
    }
}

/// The trailing context window of a transcript
pub fn context_window(turns: &[Turn], window_turns: usize) -> &[Turn] {
    let start = turns.len().saturating_sub(window_turns);
    &turns[start..]
}

/// Fold a window of raw turns into a strictly alternating sequence
///
/// Consecutive turns with the same role are merged into one entry by
/// appending text with `separator`; no text is dropped or reordered.
/// Pure function of its input, empty window yields empty output.
///
/// A sequence that starts with a model turn is accepted and forwarded
/// unchanged; the upstream API tolerates it and rejecting would strand
/// otherwise-usable history.
pub fn sanitize_turns(window: &[Turn], separator: &str) -> Vec<SanitizedTurn> {
    let mut sanitized: Vec<SanitizedTurn> = Vec::with_capacity(window.len());

    for turn in window {
        match sanitized.last_mut() {
            Some(last) if last.role == turn.role => {
                last.text.push_str(separator);
                last.text.push_str(&turn.text);
            }
            _ => sanitized.push(SanitizedTurn {
                role: turn.role,
                text: turn.text.clone(),
            }),
        }
    }

    sanitized
}

/// Convenience wrapper: window then sanitize, per the given config
pub fn sanitize_transcript(turns: &[Turn], config: &SanitizerConfig) -> Vec<SanitizedTurn> {
    sanitize_turns(
        context_window(turns, config.window_turns),
        &config.merge_separator,
    )
}

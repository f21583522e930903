//! Boundary to the speech collaborators
//!
//! Recognition and synthesis live outside this crate (platform speech
//! APIs on the client). The session controller only consumes the event
//! stream: a final utterance triggers a message submission, interim text
//! is live display only.

use crate::llm::Language;
use crate::Result;
use crossbeam_channel::{bounded, Receiver, Sender};

/// Events delivered by a speech-input collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// A finalized utterance, ready to submit
    Final(String),

    /// Partial recognition text for live display
    Interim(String),

    /// The recognition session ended without a final utterance
    Ended,

    /// Recognition failed or permission was denied
    Error(String),
}

/// Speech-to-text collaborator
pub trait SpeechInput: Send + Sync {
    /// Begin a recognition session, delivering events on `events`
    fn start_listening(&self, events: Sender<VoiceEvent>, language: Language) -> Result<()>;

    /// Stop the current recognition session, if any
    fn stop_listening(&self);
}

/// Text-to-speech collaborator
pub trait SpeechOutput: Send + Sync {
    /// Read text aloud; allowed even while a cooldown is active
    fn speak(&self, text: &str, language: Language) -> Result<()>;
}

/// Channel pair for voice events
pub fn voice_channel(buffer_size: usize) -> (Sender<VoiceEvent>, Receiver<VoiceEvent>) {
    bounded(buffer_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_channel_delivers_events() {
        let (tx, rx) = voice_channel(10);
        tx.send(VoiceEvent::Interim("hal".to_string())).unwrap();
        tx.send(VoiceEvent::Final("hallo".to_string())).unwrap();

        assert_eq!(rx.recv().unwrap(), VoiceEvent::Interim("hal".to_string()));
        assert_eq!(rx.recv().unwrap(), VoiceEvent::Final("hallo".to_string()));
    }
}

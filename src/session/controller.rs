//! Session controller
//!
//! Orchestrates one conversation session: appends turns, builds the
//! sanitized request, calls the gateway, parses the reply, and drives
//! the cooldown coordinator. All gateway and persistence failures are
//! converted to user-visible state here; nothing propagates as an
//! unhandled fault to the HTTP layer.

use crate::llm::{
    gateway::{GenerateRequest, ModelGateway},
    parse_reply, prompts, sanitize,
    Language, ModelId,
};
use crate::ratelimit::{CooldownCoordinator, CooldownTick, ErrorClass};
use crate::session::config::SessionConfig;
use crate::transcript::{TranscriptStore, Turn};
use crate::voice::{SpeechInput, SpeechOutput, VoiceEvent};
use crate::{ParloError, Result};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of a successful chat exchange
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The model's main reply text
    pub response: String,

    /// The full transcript after the exchange
    pub history: Vec<Turn>,
}

/// UI-facing snapshot of the session state
#[derive(Debug, Clone, Default)]
pub struct SessionStatus {
    /// Whole seconds until sends/recordings unblock; zero when idle
    pub cooldown_remaining: u64,

    /// Current error banner, if any
    pub error: Option<String>,

    pub is_recording: bool,

    /// Live interim recognition text
    pub interim_text: String,

    /// Whether a gateway request is in flight
    pub is_pending: bool,
}

/// Resets the in-flight flag when a send completes or fails
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SessionController {
    config: SessionConfig,
    store: TranscriptStore,
    gateway: Arc<dyn ModelGateway>,
    cooldown: Mutex<CooldownCoordinator>,
    last_error: Mutex<Option<String>>,
    interim_text: Mutex<String>,
    is_recording: AtomicBool,
    is_pending: AtomicBool,
    auto_speak: AtomicBool,
    speech_input: Option<Arc<dyn SpeechInput>>,
    speech_output: Option<Arc<dyn SpeechOutput>>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        store: TranscriptStore,
        gateway: Arc<dyn ModelGateway>,
    ) -> Self {
        let cooldown = CooldownCoordinator::new(config.cooldown.clone());
        let auto_speak = config.auto_speak;

        Self {
            config,
            store,
            gateway,
            cooldown: Mutex::new(cooldown),
            last_error: Mutex::new(None),
            interim_text: Mutex::new(String::new()),
            is_recording: AtomicBool::new(false),
            is_pending: AtomicBool::new(false),
            auto_speak: AtomicBool::new(auto_speak),
            speech_input: None,
            speech_output: None,
        }
    }

    /// Attach speech collaborators
    pub fn with_speech(
        mut self,
        input: Arc<dyn SpeechInput>,
        output: Arc<dyn SpeechOutput>,
    ) -> Self {
        self.speech_input = Some(input);
        self.speech_output = Some(output);
        self
    }

    /// Submit a user message and wait for the model's reply
    ///
    /// Refused while a cooldown is active or another request is in
    /// flight. Never auto-retries: after a rate-limit failure the caller
    /// must re-submit once the cooldown elapses.
    pub async fn send_message(
        &self,
        text: &str,
        language: Language,
        model: Option<ModelId>,
    ) -> Result<ChatOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParloError::EmptyMessage);
        }

        let now = Instant::now();
        {
            let cooldown = self.cooldown.lock();
            if cooldown.is_cooling(now) {
                let wait_secs = cooldown.seconds_remaining(now);
                debug!(wait_secs, "send refused during cooldown");
                return Err(ParloError::CoolingDown { wait_secs });
            }
        }

        // One request in flight per session, no pipelining
        if self
            .is_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ParloError::Busy);
        }
        let _pending = PendingGuard(&self.is_pending);

        self.interim_text.lock().clear();
        *self.last_error.lock() = None;

        self.store.append_and_save(Turn::user(text)).map_err(|e| {
            self.set_error(&e);
            e
        })?;

        let model = model.unwrap_or(self.config.llm.default_model);
        let contents = sanitize::sanitize_transcript(&self.store.turns(), &self.config.sanitizer);
        let request = GenerateRequest {
            model,
            system_instruction: prompts::build_system_instruction(language),
            contents,
            temperature: self.config.llm.temperature,
        };

        match self.gateway.generate(request).await {
            Ok(raw) => {
                let parsed = parse_reply(&raw);
                let turn = Turn::model(
                    parsed.main.clone(),
                    parsed.correction,
                    parsed.translation,
                );
                self.store.append_and_save(turn).map_err(|e| {
                    self.set_error(&e);
                    e
                })?;

                info!(chars = parsed.main.len(), "exchange complete");
                let outcome = ChatOutcome {
                    response: parsed.main,
                    history: self.store.turns(),
                };

                if self.auto_speak.load(Ordering::SeqCst) {
                    self.speak(&outcome.response, language);
                }

                Ok(outcome)
            }
            Err(ParloError::Gateway(message)) => {
                let class = self.cooldown.lock().note_failure(&message, Instant::now());
                match class {
                    ErrorClass::RateLimited { wait_secs } => {
                        let error = ParloError::CoolingDown { wait_secs };
                        self.set_error(&error);
                        Err(error)
                    }
                    ErrorClass::Generic => {
                        let error = ParloError::Gateway(message);
                        self.set_error(&error);
                        Err(error)
                    }
                }
            }
            Err(error) => {
                // Empty reply and other gateway faults: one-shot error,
                // immediately retryable
                self.set_error(&error);
                Err(error)
            }
        }
    }

    /// Start a voice-recording session; a no-op while cooling
    ///
    /// Returns `Ok(false)` when refused by an active cooldown.
    pub fn start_recording(&self, events: Sender<VoiceEvent>, language: Language) -> Result<bool> {
        if self.cooldown.lock().is_cooling(Instant::now()) {
            debug!("recording refused during cooldown");
            return Ok(false);
        }

        let input = self
            .speech_input
            .as_ref()
            .ok_or_else(|| ParloError::Voice("Speech recognition is not available".to_string()))?;

        *self.last_error.lock() = None;
        self.interim_text.lock().clear();

        if let Err(e) = input.start_listening(events, language) {
            // Permission errors surface once; recording reverts to off
            self.is_recording.store(false, Ordering::SeqCst);
            self.set_error(&e);
            return Err(e);
        }

        self.is_recording.store(true, Ordering::SeqCst);
        Ok(true)
    }

    /// Stop the current voice-recording session
    pub fn stop_recording(&self) {
        if let Some(input) = &self.speech_input {
            input.stop_listening();
        }
        self.is_recording.store(false, Ordering::SeqCst);
        self.interim_text.lock().clear();
    }

    /// Handle one event from the speech-input collaborator
    ///
    /// A final utterance ends the recording session and is submitted as
    /// a message; the exchange outcome is returned in that case.
    pub async fn on_voice_event(
        &self,
        event: VoiceEvent,
        language: Language,
        model: Option<ModelId>,
    ) -> Option<Result<ChatOutcome>> {
        match event {
            VoiceEvent::Interim(text) => {
                *self.interim_text.lock() = text;
                None
            }
            VoiceEvent::Final(text) => {
                self.is_recording.store(false, Ordering::SeqCst);
                self.interim_text.lock().clear();
                Some(self.send_message(&text, language, model).await)
            }
            VoiceEvent::Ended => {
                self.is_recording.store(false, Ordering::SeqCst);
                self.interim_text.lock().clear();
                None
            }
            VoiceEvent::Error(message) => {
                warn!("voice error: {}", message);
                self.is_recording.store(false, Ordering::SeqCst);
                self.interim_text.lock().clear();
                self.set_error(&ParloError::Voice(message));
                None
            }
        }
    }

    /// Read text aloud, if a voice output is attached
    ///
    /// Allowed regardless of cooldown state.
    pub fn speak(&self, text: &str, language: Language) {
        if let Some(output) = &self.speech_output {
            if let Err(e) = output.speak(text, language) {
                warn!("speech output failed: {}", e);
            }
        }
    }

    pub fn toggle_auto_speak(&self) -> bool {
        !self.auto_speak.fetch_xor(true, Ordering::SeqCst)
    }

    /// Clear the transcript and any active cooldown
    ///
    /// The reset always clears the cooldown and error banner, even if
    /// the store write fails.
    pub fn clear_history(&self) -> Result<()> {
        self.cooldown.lock().reset();
        *self.last_error.lock() = None;

        self.store.clear().map_err(|e| {
            *self.last_error.lock() = Some("Failed to clear history.".to_string());
            e
        })
    }

    /// Advance the cooldown; call at 1 Hz
    ///
    /// When the cooldown elapses the associated error banner is cleared
    /// so it is not left stale.
    pub fn tick(&self, now: Instant) -> CooldownTick {
        let tick = self.cooldown.lock().tick(now);
        if tick == CooldownTick::Expired {
            *self.last_error.lock() = None;
            info!("cooldown elapsed, sends unblocked");
        }
        tick
    }

    /// Snapshot the full transcript
    pub fn history(&self) -> Vec<Turn> {
        self.store.turns()
    }

    /// Whether the gateway has provider credentials
    pub fn gateway_connected(&self) -> bool {
        self.config.llm.is_connected()
    }

    /// UI-facing snapshot of the session
    pub fn status(&self, now: Instant) -> SessionStatus {
        SessionStatus {
            cooldown_remaining: self.cooldown.lock().seconds_remaining(now),
            error: self.last_error.lock().clone(),
            is_recording: self.is_recording.load(Ordering::SeqCst),
            interim_text: self.interim_text.lock().clone(),
            is_pending: self.is_pending.load(Ordering::SeqCst),
        }
    }

    fn set_error(&self, error: &ParloError) {
        *self.last_error.lock() = Some(error.user_message());
    }
}

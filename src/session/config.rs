//! Configuration for a tutoring session
//!
//! Centralizes the tunables of all components. The reference constants
//! (20-turn context window, 30 s fallback cooldown, 1 s retry buffer,
//! newline merge separator) are defaults here, not hard-coded at the
//! point of use.

use crate::llm::{LlmConfig, SanitizerConfig};
use crate::ratelimit::CooldownConfig;
use crate::{ParloError, Result};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3001;

/// Configuration for the complete session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Remote model gateway configuration
    pub llm: LlmConfig,

    /// Context-window and merge behaviour for outbound requests
    pub sanitizer: SanitizerConfig,

    /// Rate-limit cooldown behaviour
    pub cooldown: CooldownConfig,

    /// Directory holding the persisted transcript
    pub data_dir: PathBuf,

    /// HTTP listen port
    pub port: u16,

    /// Speak model replies aloud when a voice output is attached
    pub auto_speak: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            sanitizer: SanitizerConfig::default(),
            cooldown: CooldownConfig::default(),
            data_dir: default_data_dir(),
            port: DEFAULT_PORT,
            auto_speak: true,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parlo")
}

impl SessionConfig {
    /// Build a configuration from the environment: API key via
    /// `GEMINI_API_KEY`/`API_KEY`, data dir via `PARLO_DATA_DIR`, port
    /// via `PARLO_PORT`.
    pub fn from_env() -> Self {
        let mut config = Self {
            llm: LlmConfig::from_env(),
            ..Self::default()
        };

        if let Ok(dir) = std::env::var("PARLO_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(port) = std::env::var("PARLO_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }

        config
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_llm(mut self, llm: LlmConfig) -> Self {
        self.llm = llm;
        self
    }

    pub fn without_auto_speak(mut self) -> Self {
        self.auto_speak = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sanitizer.window_turns == 0 {
            return Err(ParloError::Config(
                "context window must hold at least one turn".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ParloError::Config(format!(
                "temperature {} outside supported range",
                self.llm.temperature
            )));
        }
        if self.cooldown.fallback_secs == 0 {
            return Err(ParloError::Config(
                "fallback cooldown must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

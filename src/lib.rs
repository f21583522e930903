pub mod llm;
pub mod ratelimit;
pub mod server;
pub mod session;
pub mod transcript;
pub mod voice;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ParloError {
    #[error("Empty message")]
    EmptyMessage,

    #[error("Rate limited, retry in {wait_secs}s")]
    CoolingDown { wait_secs: u64 },

    #[error("A request is already in flight")]
    Busy,

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Empty response from model")]
    EmptyReply,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Voice error: {0}")]
    Voice(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for ParloError {
    fn from(e: std::io::Error) -> Self {
        ParloError::Storage(e.to_string())
    }
}

impl ParloError {
    /// Check if this error is recoverable by retrying
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Rejected client-side before a request is ever sent
            ParloError::EmptyMessage => true,
            // Becomes retryable once the cooldown elapses
            ParloError::CoolingDown { .. } => true,
            // Retryable as soon as the in-flight request settles
            ParloError::Busy => true,
            ParloError::Gateway(_) => true,
            ParloError::EmptyReply => true,
            ParloError::Storage(_) => false,
            ParloError::Voice(_) => true,
            ParloError::Config(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            ParloError::EmptyMessage => "Message required".to_string(),
            ParloError::CoolingDown { wait_secs } => {
                format!("Rate limit exceeded. Pausing for {} seconds.", wait_secs)
            }
            ParloError::Busy => {
                "Still waiting for the previous response. Please hold on.".to_string()
            }
            ParloError::Gateway(msg) => msg.clone(),
            ParloError::EmptyReply => "Failed to get response from AI.".to_string(),
            ParloError::Storage(_) => "Failed to save chat history.".to_string(),
            ParloError::Voice(msg) => msg.clone(),
            ParloError::Config(_) => "Configuration error. Please check settings.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParloError>;

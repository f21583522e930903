use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Wire-format string used by the upstream model API
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A single message in the conversation transcript
///
/// `correction` and `translation` are only ever present on model turns;
/// user turns carry plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,

    pub text: String,

    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl Turn {
    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
            correction: None,
            translation: None,
        }
    }

    /// Create a model turn, with text already stripped of section markers
    pub fn model(
        text: impl Into<String>,
        correction: Option<String>,
        translation: Option<String>,
    ) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            timestamp: Utc::now(),
            correction,
            translation,
        }
    }
}

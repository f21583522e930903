//! Configuration for the upstream model gateway

use serde::{Deserialize, Serialize};

/// Supported upstream model identifiers
///
/// The set is closed; an unrecognized wire value falls back to the
/// default model rather than failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelId {
    #[default]
    Gemini25Flash,
    Gemini25FlashLite,
    Gemini25Pro,
}

impl ModelId {
    /// Wire name used in the upstream endpoint path
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gemini25Flash => "gemini-2.5-flash",
            ModelId::Gemini25FlashLite => "gemini-2.5-flash-lite",
            ModelId::Gemini25Pro => "gemini-2.5-pro",
        }
    }

    /// All supported models, default first
    pub fn all() -> &'static [ModelId] {
        &[
            ModelId::Gemini25Flash,
            ModelId::Gemini25FlashLite,
            ModelId::Gemini25Pro,
        ]
    }
}

impl From<String> for ModelId {
    fn from(value: String) -> Self {
        match value.as_str() {
            "gemini-2.5-flash" => ModelId::Gemini25Flash,
            "gemini-2.5-flash-lite" => ModelId::Gemini25FlashLite,
            "gemini-2.5-pro" => ModelId::Gemini25Pro,
            _ => ModelId::default(),
        }
    }
}

impl From<ModelId> for String {
    fn from(value: ModelId) -> Self {
        value.as_str().to_string()
    }
}

/// Language the student is practicing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
}

impl Language {
    /// Human-readable name used in the system instruction
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::De => "German",
        }
    }

    /// The other language, used for translations of model replies
    pub fn other(&self) -> Language {
        match self {
            Language::En => Language::De,
            Language::De => Language::En,
        }
    }

    /// BCP-47 hint passed to the voice collaborators
    pub fn voice_hint(&self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::De => "de-DE",
        }
    }
}

/// Configuration for the remote model gateway
#[derive(Clone, Debug)]
pub struct LlmConfig {
    /// Model used when a request does not name one
    pub default_model: ModelId,

    /// Sampling temperature sent with every request
    pub temperature: f32,

    /// Base URL of the generative-model API
    pub base_url: String,

    /// Provider API key; `None` means the gateway is disconnected
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_model: ModelId::default(),
            temperature: 0.7,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the environment (`GEMINI_API_KEY`, falling
    /// back to `API_KEY` as the original deployment injected it)
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.is_empty());

        Self {
            api_key,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Whether the gateway has credentials to reach the provider
    pub fn is_connected(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_falls_back_to_default() {
        let model: ModelId = serde_json::from_str("\"gemini-9000-ultra\"").unwrap();
        assert_eq!(model, ModelId::Gemini25Flash);
    }

    #[test]
    fn test_known_model_roundtrip() {
        let model: ModelId = serde_json::from_str("\"gemini-2.5-pro\"").unwrap();
        assert_eq!(model, ModelId::Gemini25Pro);
        assert_eq!(serde_json::to_string(&model).unwrap(), "\"gemini-2.5-pro\"");
    }

    #[test]
    fn test_language_other() {
        assert_eq!(Language::En.other(), Language::De);
        assert_eq!(Language::De.other(), Language::En);
        assert_eq!(Language::De.voice_hint(), "de-DE");
    }

    #[test]
    fn test_supported_models_default_first() {
        let all = ModelId::all();
        assert_eq!(all[0], ModelId::default());
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert_eq!(config.default_model, ModelId::Gemini25Flash);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert!(!config.is_connected());
    }
}

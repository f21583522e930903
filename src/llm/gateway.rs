//! Remote model gateway
//!
//! Stateless client for the hosted generative-model API. The provider
//! gives no structured error code on failure, only a human-readable
//! message; that message is surfaced verbatim so the rate-limit
//! classifier can inspect it.

use crate::llm::config::{LlmConfig, ModelId};
use crate::llm::sanitize::SanitizedTurn;
use crate::{ParloError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// One outbound generation request
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: ModelId,
    pub system_instruction: String,
    pub contents: Vec<SanitizedTurn>,
    pub temperature: f32,
}

/// Seam to the upstream model, mockable in tests
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send sanitized turns plus a system instruction and return the raw
    /// reply text. Errors carry the provider's message when available.
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}

#[derive(Serialize)]
struct WirePart {
    text: String,
}

#[derive(Serialize)]
struct WireContent {
    role: &'static str,
    parts: Vec<WirePart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    contents: Vec<WireContent>,
    system_instruction: WireSystemInstruction,
    generation_config: WireGenerationConfig,
}

#[derive(Serialize)]
struct WireSystemInstruction {
    parts: Vec<WirePart>,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Deserialize)]
struct WireCandidate {
    content: Option<WireResponseContent>,
}

#[derive(Deserialize)]
struct WireResponseContent {
    #[serde(default)]
    parts: Vec<WireResponsePart>,
}

#[derive(Deserialize)]
struct WireResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct WireErrorBody {
    error: WireErrorDetail,
}

#[derive(Deserialize)]
struct WireErrorDetail {
    message: String,
}

/// Gateway implementation for the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiGateway {
    client: reqwest::Client,
    config: LlmConfig,
}

impl GeminiGateway {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, model: ModelId) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url,
            model.as_str()
        )
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ParloError::Gateway("API key is not configured".to_string()))?;

        let request_id = Uuid::new_v4();
        let body = WireRequest {
            contents: request
                .contents
                .iter()
                .map(|turn| WireContent {
                    role: turn.role.as_str(),
                    parts: vec![WirePart {
                        text: turn.text.clone(),
                    }],
                })
                .collect(),
            system_instruction: WireSystemInstruction {
                parts: vec![WirePart {
                    text: request.system_instruction,
                }],
            },
            generation_config: WireGenerationConfig {
                temperature: request.temperature,
            },
        };

        debug!(
            %request_id,
            model = request.model.as_str(),
            turns = request.contents.len(),
            "sending generate request"
        );

        let response = self
            .client
            .post(self.endpoint(request.model))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ParloError::Gateway(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| ParloError::Gateway(e.to_string()))?;

        if !status.is_success() {
            // Prefer the provider's own message; it carries the retry
            // hints the rate-limit classifier looks for.
            let message = serde_json::from_str::<WireErrorBody>(&raw)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| format!("{} {}", status.as_u16(), raw));
            warn!(%request_id, %status, "generate request failed: {}", message);
            return Err(ParloError::Gateway(message));
        }

        let parsed: WireResponse =
            serde_json::from_str(&raw).map_err(|e| ParloError::Gateway(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            warn!(%request_id, "provider returned empty reply text");
            return Err(ParloError::EmptyReply);
        }

        debug!(%request_id, chars = text.len(), "generate request complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Role;

    #[test]
    fn test_endpoint_includes_model_wire_name() {
        let gateway = GeminiGateway::new(LlmConfig::default().with_api_key("k"));
        let url = gateway.endpoint(ModelId::Gemini25Pro);
        assert!(url.ends_with("/v1beta/models/gemini-2.5-pro:generateContent"));
    }

    #[test]
    fn test_wire_request_shape() {
        let body = WireRequest {
            contents: vec![WireContent {
                role: Role::User.as_str(),
                parts: vec![WirePart {
                    text: "hi".to_string(),
                }],
            }],
            system_instruction: WireSystemInstruction {
                parts: vec![WirePart {
                    text: "be helpful".to_string(),
                }],
            },
            generation_config: WireGenerationConfig { temperature: 0.7 },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be helpful");
        assert_eq!(json["generationConfig"]["temperature"], 0.7);
    }

    #[test]
    fn test_provider_error_body_parses() {
        let raw = r#"{"error":{"code":429,"message":"Quota exceeded. Please retry in 12.5s","status":"RESOURCE_EXHAUSTED"}}"#;
        let body: WireErrorBody = serde_json::from_str(raw).unwrap();
        assert!(body.error.message.contains("retry in 12.5"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_gateway_error() {
        let gateway = GeminiGateway::new(LlmConfig::default());
        let result = gateway
            .generate(GenerateRequest {
                model: ModelId::default(),
                system_instruction: String::new(),
                contents: Vec::new(),
                temperature: 0.7,
            })
            .await;

        assert!(matches!(result, Err(ParloError::Gateway(_))));
    }
}

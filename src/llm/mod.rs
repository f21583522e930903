pub mod config;
pub mod gateway;
pub mod parser;
pub mod prompts;
pub mod sanitize;

pub use config::{Language, LlmConfig, ModelId};
pub use gateway::{GeminiGateway, GenerateRequest, ModelGateway};
pub use parser::{parse_reply, ParsedReply};
pub use sanitize::{sanitize_turns, SanitizedTurn, SanitizerConfig};

//! Wire envelopes for the supported text-generation providers.

use serde::Serialize;

use crate::config::{ModelConfig, Provider};

/// Sampling temperature; zero keeps answers repeatable.
pub const TEMPERATURE: f32 = 0.0;

/// Output cap. A label is one or two words.
pub const MAX_OUTPUT_TOKENS: u32 = 16;

// ── Gemini generateContent ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub system_instruction: GeminiContent,
    pub contents: Vec<GeminiContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
pub struct GeminiPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

// ── OpenAI-compatible chat/completions ──

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Gemini(GeminiRequest),
    Chat(ChatRequest),
}

/// How the credential travels with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    QueryKey(String),
    Bearer(String),
}

/// A fully-specified outbound request.
#[derive(Debug)]
pub struct ProviderRequest {
    pub url: String,
    pub credential: Credential,
    pub body: RequestBody,
}

impl Provider {
    /// JSON pointer to the generated text in a successful response.
    pub fn text_pointer(&self) -> &'static str {
        match self {
            Self::Gemini => "/candidates/0/content/parts/0/text",
            Self::OpenAi => "/choices/0/message/content",
        }
    }
}

/// Build the outbound request for `config.provider`.
pub fn build_request(config: &ModelConfig, system: String, user: String) -> ProviderRequest {
    match config.provider {
        Provider::Gemini => ProviderRequest {
            url: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url, config.model
            ),
            credential: Credential::QueryKey(config.api_key.clone()),
            body: RequestBody::Gemini(GeminiRequest {
                system_instruction: GeminiContent {
                    role: None,
                    parts: vec![GeminiPart { text: system }],
                },
                contents: vec![GeminiContent {
                    role: Some("user"),
                    parts: vec![GeminiPart { text: user }],
                }],
                generation_config: GenerationConfig {
                    temperature: TEMPERATURE,
                    max_output_tokens: MAX_OUTPUT_TOKENS,
                },
            }),
        },
        Provider::OpenAi => ProviderRequest {
            url: format!("{}/v1/chat/completions", config.base_url),
            credential: Credential::Bearer(config.api_key.clone()),
            body: RequestBody::Chat(ChatRequest {
                model: config.model.clone(),
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: user,
                    },
                ],
                temperature: TEMPERATURE,
                max_tokens: MAX_OUTPUT_TOKENS,
            }),
        },
    }
}

//! OpenAI-compatible completion provider
//!
//! Works against OpenAI, OpenRouter and any `/chat/completions` endpoint.

use crate::*;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, trace};

const DEFAULT_TEMPERATURE: f32 = 0.0;
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// OpenAI-compatible provider
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    default_model: String,
    is_openrouter: bool,
}

impl OpenAiProvider {
    pub fn new(
        api_key: impl Into<String>,
        api_base: Option<String>,
        default_model: Option<String>,
    ) -> Self {
        let api_key = api_key.into();
        let is_openrouter = api_key.starts_with("sk-or-")
            || api_base
                .as_ref()
                .map(|b| b.contains("openrouter"))
                .unwrap_or(false);

        let api_base = api_base.unwrap_or_else(|| {
            if is_openrouter {
                "https://openrouter.ai/api/v1".to_string()
            } else {
                "https://api.openai.com/v1".to_string()
            }
        });

        let default_model = default_model.unwrap_or_else(|| {
            if is_openrouter {
                "openai/gpt-4-1106-preview".to_string()
            } else {
                "gpt-4-1106-preview".to_string()
            }
        });

        Self {
            client: Client::new(),
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            default_model,
            is_openrouter,
        }
    }

    pub fn is_openrouter(&self) -> bool {
        self.is_openrouter
    }

    fn build_request(&self, prompt: &str, options: &CompletionOptions) -> serde_json::Value {
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "temperature": options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String> {
        let choice = json["choices"]
            .get(0)
            .ok_or(ProviderError::InvalidResponse)?;

        choice["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(ProviderError::InvalidResponse)
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiProvider {
    async fn call(&self, prompt: &str, options: &CompletionOptions) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NoApiKey);
        }

        let url = format!("{}/chat/completions", self.api_base);
        trace!("calling {}", url);

        let body = self.build_request(prompt, options);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }

        let json: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let error = json["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(ProviderError::Api(error));
        }

        debug!(
            "completion received ({} prompt chars, model {})",
            prompt.len(),
            body["model"]
        );

        self.parse_response(json)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

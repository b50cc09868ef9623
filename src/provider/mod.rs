// The completion collaborator contract. The session manager only sees this
// trait; the vendor wire schemas live in the per-provider modules.

mod gemini;
mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::ProviderKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior turn, oldest first, as forwarded to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        ChatTurn { role, content: content.into() }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to reach completion endpoint: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion endpoint returned status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

/// A text-completion backend. One call per submitted turn, full reply
/// awaited, no retry, no streaming.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        history: &[ChatTurn],
        user_message: &str,
    ) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    /// Endpoint URL; empty selects the provider's default.
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
}

impl ProviderSettings {
    pub fn endpoint_or_default(&self) -> String {
        if self.endpoint.is_empty() {
            self.kind.default_url().to_string()
        } else {
            self.endpoint.clone()
        }
    }
}

pub fn build_provider(settings: ProviderSettings) -> Arc<dyn CompletionProvider> {
    match settings.kind {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(settings)),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(settings)),
    }
}

/// Builds the configured provider from HELIO_* environment settings.
pub fn provider_from_env(system_prompt: &str) -> anyhow::Result<Arc<dyn CompletionProvider>> {
    let kind: ProviderKind = crate::config::PROVIDER_KIND.parse()?;
    Ok(build_provider(ProviderSettings {
        kind,
        endpoint: crate::config::API_URL.clone(),
        api_key: crate::config::API_KEY.clone(),
        model: crate::config::MODEL.clone(),
        system_prompt: system_prompt.to_string(),
    }))
}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ChatRole, ChatTurn, CompletionProvider, ProviderError, ProviderSettings};

// Structures matching the OpenAI-style chat completions endpoint.
#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireMessage,
}

pub struct OpenAiProvider {
    client: Client,
    settings: ProviderSettings,
}

impl OpenAiProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        OpenAiProvider { client: Client::new(), settings }
    }

    fn build_messages(&self, history: &[ChatTurn], user_message: &str) -> Vec<WireMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(WireMessage {
            role: "system".to_string(),
            content: self.settings.system_prompt.clone(),
        });
        for turn in history {
            messages.push(WireMessage {
                role: match turn.role {
                    ChatRole::User => "user".to_string(),
                    ChatRole::Assistant => "assistant".to_string(),
                },
                content: turn.content.clone(),
            });
        }
        messages.push(WireMessage {
            role: "user".to_string(),
            content: user_message.to_string(),
        });
        messages
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    #[instrument(skip(self, history, user_message))]
    async fn complete(
        &self,
        history: &[ChatTurn],
        user_message: &str,
    ) -> Result<String, ProviderError> {
        let request_payload = ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages: self.build_messages(history, user_message),
        };
        let endpoint = self.settings.endpoint_or_default();
        debug!(%endpoint, turns = history.len(), "Sending chat completion request");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&request_payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Chat completion request failed");
            return Err(ProviderError::Status { status, body });
        }

        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse("empty choices array".to_string()))?;

        debug!(reply_len = reply.len(), "Received chat completion reply");
        Ok(reply.trim().to_string())
    }
}

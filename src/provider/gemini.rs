use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ChatRole, ChatTurn, CompletionProvider, ProviderError, ProviderSettings};

// Structures matching the Gemini generateContent endpoint. Gemini has no
// system role; the system prompt is prepended to the first user part.
#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

pub struct GeminiProvider {
    client: Client,
    settings: ProviderSettings,
}

impl GeminiProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        GeminiProvider { client: Client::new(), settings }
    }

    fn build_contents(&self, history: &[ChatTurn], user_message: &str) -> Vec<Content> {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: Some(
                    match turn.role {
                        ChatRole::User => "user",
                        ChatRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part { text: turn.content.clone() }],
            })
            .collect();
        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part { text: user_message.to_string() }],
        });

        // Fold the system prompt into the first user turn.
        if let Some(first_user) = contents
            .iter_mut()
            .find(|content| content.role.as_deref() == Some("user"))
        {
            if let Some(part) = first_user.parts.first_mut() {
                part.text = format!(
                    "{}\n\nUser message: {}",
                    self.settings.system_prompt, part.text
                );
            }
        }
        contents
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    #[instrument(skip(self, history, user_message))]
    async fn complete(
        &self,
        history: &[ChatTurn],
        user_message: &str,
    ) -> Result<String, ProviderError> {
        let request_payload = GenerateContentRequest {
            contents: self.build_contents(history, user_message),
        };
        let endpoint = self.settings.endpoint_or_default();
        debug!(%endpoint, turns = history.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&request_payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "generateContent request failed");
            return Err(ProviderError::Status { status, body });
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        let reply = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("no candidates with text parts".to_string())
            })?;

        debug!(reply_len = reply.len(), "Received generateContent reply");
        Ok(reply.trim().to_string())
    }
}

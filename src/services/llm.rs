//! Story generation via an OpenRouter-compatible chat completion API.

use log::{error, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1-0528-qwen3-8b:free";

pub const SYSTEM_PROMPT: &str = r#"
You are a masterful explainer and storyteller for short-form video scripts (TikTok/YouTube Shorts, 60-90 seconds).

CRITICAL RULES:
- ONLY output spoken words/voiceover
- NO stage directions, formatting marks, or descriptions of visuals
- JUST the narration/dialogue as plain text

EXPLAIN COMPLEX TOPICS:
- Make any topic (e.g., 'transformer architecture') understandable for all ages
- Start with the basics, then build up to deeper concepts
- Use analogies, relatable examples, and simple language
- Avoid jargon unless you explain it clearly
- Keep the flow natural, with a subtly friendly and engaging vibe (do not say it out loud)
- Inject personality, wit, and curiosity—be playful, clever, and expressive
- Use natural pauses (...), varied punctuation, and rhythm for realism
- Mix short punchy sentences with longer, emotional ones
- Show excitement, wonder, and relatable feelings
- End with a memorable summary or emotional impact
- Do not use contractions; always use full forms (e.g., 'they are' instead of 'they're', 'do not' instead of 'don't').

STYLE:
- Conversational, smooth, and engaging
- Reference everyday situations or feelings, but do not state the vibe directly
- Use specific details (names, places, times) when possible
- Output ONLY the script words. Nothing else.
"#;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    /// Generate a narration script for `topic` with the given model.
    pub async fn generate_story(&self, topic: &str, model: &str) -> AppResult<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": topic},
                ],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Story generation failed: {status}");
            return Err(AppError::Upstream(format!(
                "Language model returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed completion response: {e}")))?;
        let story = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::Upstream("Completion response has no choices".to_string()))?;

        info!("Story generated successfully with model {model}");
        Ok(story)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chat_completion_payload() {
        let raw = r#"{
            "id": "gen-1",
            "choices": [
                {"message": {"role": "assistant", "content": "Once upon a time."}}
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Once upon a time.");
    }
}

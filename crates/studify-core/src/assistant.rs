//! AI study assistant: a thin pass-through to a hosted chat-completions
//! API.
//!
//! One request per question, carrying the system prompt plus the full
//! conversation history. No streaming and no retries; any failure
//! surfaces to the user as the single fixed fallback message.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AssistantConfig;
use crate::error::AssistantError;

/// Shown in place of an answer whenever the request fails.
pub const FALLBACK_MESSAGE: &str =
    "Sorry, I encountered an error. Please make sure your API key is configured correctly.";

const SYSTEM_PROMPT: &str = "You are a helpful study assistant. Help students with their \
     homework, explain concepts, and provide study tips. Keep responses concise and clear.";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "STUDIFY_ASSISTANT_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

pub struct AssistantClient {
    http: reqwest::Client,
    rt: tokio::runtime::Runtime,
    api_url: String,
    model: String,
    api_key: String,
}

impl AssistantClient {
    /// Build a client from config, taking the API key from the
    /// environment.
    ///
    /// # Errors
    /// Fails when no API key is set or the runtime cannot start.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AssistantError::MissingApiKey)?;
        Self::with_api_key(&config.api_url, &config.model, &api_key)
    }

    pub fn with_api_key(
        api_url: &str,
        model: &str,
        api_key: &str,
    ) -> Result<Self, AssistantError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            http: reqwest::Client::new(),
            rt,
            api_url: api_url.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Ask one question in the context of `history`. Returns the
    /// assistant's reply.
    pub fn ask(
        &self,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, AssistantError> {
        let mut messages = vec![json!({"role": "system", "content": SYSTEM_PROMPT})];
        for message in history {
            messages.push(serde_json::to_value(message).unwrap_or_default());
        }
        messages.push(json!({"role": "user", "content": user_message}));

        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": 0.7,
            "max_tokens": 1024,
        });

        let response: serde_json::Value = self.rt.block_on(async {
            self.http
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
        })?;

        response["choices"][0]["message"]["content"]
            .as_str()
            .map(|content| content.to_string())
            .ok_or(AssistantError::MalformedResponse)
    }

    /// Like [`ask`](Self::ask), but degrades any failure into the fixed
    /// fallback message.
    pub fn ask_or_fallback(&self, history: &[ChatMessage], user_message: &str) -> String {
        match self.ask(history, user_message) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "assistant request failed");
                FALLBACK_MESSAGE.to_string()
            }
        }
    }
}

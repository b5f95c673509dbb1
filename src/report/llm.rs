//! Client for an OpenAI-compatible chat-completions endpoint.
//!
//! Both the résumé extractor and the report generator talk to the same
//! endpoint and always request strict-JSON output.

use crate::types::{AppError, Result};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(http: reqwest::Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    /// One system+user completion with JSON response format. Returns the
    /// raw message content; callers parse it against their own schema.
    pub async fn complete_json(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!(
                "chat endpoint returned {}: {}",
                status,
                crate::util::truncate(&body, 300)
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("chat response was not JSON: {}", e)))?;

        data.get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppError::Llm("chat response had no message content".to_string()))
    }
}

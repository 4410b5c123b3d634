use crate::{
    config::Config,
    constants::GEMINI_API_VERSION,
    errors::{ChatError, ChatResult},
    logging::log_api_call,
    models::{ApiCallLog, Generation, TokenUsage},
};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Instant;

/// Anything that can turn a prompt into generated text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> ChatResult<Generation>;
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.api_base, GEMINI_API_VERSION, self.model
        )
    }

    fn build_request_body(prompt: &str) -> Value {
        json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        })
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> ChatResult<Generation> {
        let endpoint = self.endpoint();
        debug!("Gemini request to {} ({} chars)", endpoint, prompt.len());

        let start_time = Instant::now();
        let response = self
            .http
            .post(&endpoint)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        log_api_call(&ApiCallLog {
            timestamp: Utc::now(),
            endpoint: endpoint.clone(),
            request_summary: format!("generateContent ({} chars)", prompt.len()),
            response_status: status.as_u16(),
            response_time_ms: start_time.elapsed().as_millis(),
        });

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Gemini returned {}: {}", status, error_text);
            return Err(ChatError::api_error(format!(
                "API returned error: {} - {}",
                status, error_text
            )));
        }

        let body_text = response.text().await?;
        let body: Value = serde_json::from_str(&body_text)?;

        parse_generation(&body)
    }
}

/// Extracts the reply from a `generateContent` response body.
pub fn parse_generation(body: &Value) -> ChatResult<Generation> {
    if let Some(error) = body["error"].as_object() {
        return Err(ChatError::api_error(format!(
            "{}: {}",
            error
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
            error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message")
        )));
    }

    let first = match body["candidates"].as_array().and_then(|c| c.first()) {
        Some(candidate) => candidate,
        None => {
            return Err(match body["promptFeedback"]["blockReason"].as_str() {
                Some(reason) => ChatError::api_error(format!("Prompt was blocked: {}", reason)),
                None => ChatError::api_error("Response contained no candidates"),
            });
        }
    };

    let finish_reason = first["finishReason"].as_str().map(str::to_string);

    let texts: Vec<&str> = first["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    if texts.is_empty() {
        return Err(ChatError::api_error(format!(
            "Response has no text (finish reason: {})",
            finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    let usage = match (
        body["usageMetadata"]["promptTokenCount"].as_u64(),
        body["usageMetadata"]["candidatesTokenCount"].as_u64(),
    ) {
        (Some(input), Some(output)) => Some(TokenUsage {
            input_tokens: input,
            output_tokens: output,
        }),
        _ => None,
    };

    Ok(Generation {
        text: texts.concat(),
        finish_reason,
        usage,
    })
}

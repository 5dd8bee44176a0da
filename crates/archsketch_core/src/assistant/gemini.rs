//! Blocking client for the Generative Language `generateContent` endpoint.
//!
//! # Invariants
//! - Without an API key the client reports itself unavailable and never
//!   touches the network.
//! - The API key travels in a header, never in the URL, and is never logged.

use super::completion::{CompletionError, TextCompletion};
use log::{info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const API_KEY_HEADER: &str = "x-goog-api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.8;
const TOP_K: u32 = 40;
const MAX_OUTPUT_TOKENS: u32 = 2048;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ApiError,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    http: Client,
}

impl GeminiClient {
    /// Builds a client; a blank `api_key` counts as missing.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self, CompletionError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| CompletionError::Network(err.to_string()))?;
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        let model = model.into();
        info!(
            "event=assistant_init module=assistant status=ok model={model} available={}",
            api_key.is_some()
        );
        Ok(Self {
            api_key,
            model,
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/{}:generateContent", self.model)
    }
}

impl TextCompletion for GeminiClient {
    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::Unavailable)?;
        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&build_request(prompt))
            .send()
            .map_err(|err| {
                warn!("event=assistant_call module=assistant status=error error_code=network");
                CompletionError::Network(err.without_url().to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| CompletionError::Decode(err.to_string()))?;
        if !status.is_success() {
            let err = classify_api_error(status.as_u16(), &body);
            warn!(
                "event=assistant_call module=assistant status=error http_status={}",
                status.as_u16()
            );
            return Err(err);
        }
        let text = extract_text(&body)?;
        info!(
            "event=assistant_call module=assistant status=ok chars={}",
            text.chars().count()
        );
        Ok(text)
    }
}

fn build_request(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: [Content {
            parts: [Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(body: &str) -> Result<String, CompletionError> {
    let parsed = serde_json::from_str::<GenerateResponse>(body)
        .map_err(|err| CompletionError::Decode(err.to_string()))?;
    let text = parsed
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(CompletionError::EmptyResponse);
    }
    Ok(text)
}

fn classify_api_error(status: u16, body: &str) -> CompletionError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).unwrap_or_default();
    let ApiError { message, status: code } = envelope.error;
    if message.contains("API_KEY_INVALID") || message.contains("API key not valid") {
        CompletionError::InvalidApiKey
    } else if status == 429 || code == "RESOURCE_EXHAUSTED" || message.contains("QUOTA_EXCEEDED") {
        CompletionError::QuotaExceeded
    } else if status == 404 || code == "NOT_FOUND" || message.contains("MODEL_NOT_FOUND") {
        CompletionError::ModelNotFound
    } else {
        CompletionError::Http { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::{build_request, classify_api_error, extract_text, GeminiClient, DEFAULT_GEMINI_MODEL};
    use crate::assistant::completion::{CompletionError, TextCompletion};

    #[test]
    fn request_carries_generation_config() {
        let value = serde_json::to_value(build_request("hi")).expect("encode");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        let config = &value["generationConfig"];
        assert_eq!(config["topK"], 40);
        assert_eq!(config["maxOutputTokens"], 2048);
        assert!((config["temperature"].as_f64().expect("number") - 0.7).abs() < 1e-6);
    }

    #[test]
    fn extracts_first_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Use "},{"text":"a cache."}]}}]}"#;
        assert_eq!(extract_text(body).expect("text"), "Use a cache.");
        assert_eq!(
            extract_text(r#"{"candidates":[]}"#),
            Err(CompletionError::EmptyResponse)
        );
    }

    #[test]
    fn maps_api_error_codes() {
        let invalid = r#"{"error":{"code":400,"message":"API key not valid. [API_KEY_INVALID]","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(classify_api_error(400, invalid), CompletionError::InvalidApiKey);
        let quota = r#"{"error":{"code":429,"message":"Quota","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(classify_api_error(429, quota), CompletionError::QuotaExceeded);
        assert_eq!(classify_api_error(404, "not json"), CompletionError::ModelNotFound);
        assert!(matches!(
            classify_api_error(500, "{}"),
            CompletionError::Http { status: 500, .. }
        ));
    }

    #[test]
    fn blank_key_is_unavailable_without_io() {
        let client = GeminiClient::new(Some("  ".to_string()), DEFAULT_GEMINI_MODEL).expect("client");
        assert!(!client.is_available());
        assert_eq!(client.complete("x"), Err(CompletionError::Unavailable));
    }
}

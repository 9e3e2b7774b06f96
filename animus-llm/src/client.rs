//! Blocking HTTP client for Ollama and OpenAI-compatible backends.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use animus_core::{GenerationRequest, GeneratorError, TextGenerator};

/// Provider backend for text generation.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Ollama running locally.
    Ollama {
        /// Base URL, e.g. `http://localhost:11434`.
        base_url: String,
    },
    /// Any OpenAI-compatible chat completion API.
    OpenAiCompatible {
        /// Base URL, e.g. `https://api.openai.com`.
        base_url: String,
        /// Bearer token sent with every request.
        api_key: String,
    },
    /// No backend configured — every call returns `Unavailable`.
    None,
}

/// Blocking client routing generation requests to one backend.
///
/// One HTTP call per request, bounded by the request's own timeout.
/// There is no internal retry: the engine treats a failed call as a
/// fatal turn and the player simply tries again.
pub struct LlmClient {
    provider: LlmProvider,
    model: String,
    http: Client,
}

impl LlmClient {
    /// Create a client for the given provider and model name.
    #[must_use]
    pub fn new(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            http: Client::new(),
        }
    }

    /// Create a client with no backend.
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, "")
    }

    fn call_ollama(&self, base_url: &str, request: &GenerationRequest) -> Result<String, GeneratorError> {
        let url = format!("{base_url}/api/generate");
        let body = ollama_body(&self.model, request);
        debug!(%url, model = %self.model, "ollama generation request");

        let response = self
            .http
            .post(&url)
            .timeout(Duration::from_millis(request.timeout_ms))
            .json(&body)
            .send()
            .map_err(|e| map_transport(&e, request.timeout_ms))?
            .error_for_status()
            .map_err(|e| map_transport(&e, request.timeout_ms))?;

        let value: Value = response
            .json()
            .map_err(|e| map_transport(&e, request.timeout_ms))?;
        let text = value
            .get("response")
            .and_then(Value::as_str)
            .unwrap_or_default();
        non_empty(text)
    }

    fn call_openai(
        &self,
        base_url: &str,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<String, GeneratorError> {
        let url = format!("{base_url}/v1/chat/completions");
        let body = openai_body(&self.model, request);
        debug!(%url, model = %self.model, "openai-compatible generation request");

        let response = self
            .http
            .post(&url)
            .timeout(Duration::from_millis(request.timeout_ms))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| map_transport(&e, request.timeout_ms))?
            .error_for_status()
            .map_err(|e| map_transport(&e, request.timeout_ms))?;

        let value: Value = response
            .json()
            .map_err(|e| map_transport(&e, request.timeout_ms))?;
        let text = value
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default();
        non_empty(text)
    }
}

impl TextGenerator for LlmClient {
    fn generate(&mut self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        match &self.provider {
            LlmProvider::None => {
                warn!("no generation backend configured");
                Err(GeneratorError::Unavailable(
                    "no generation backend configured".to_owned(),
                ))
            }
            LlmProvider::Ollama { base_url } => self.call_ollama(&base_url.clone(), request),
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                self.call_openai(&base_url.clone(), &api_key.clone(), request)
            }
        }
    }
}

/// Request body for Ollama's `/api/generate`.
fn ollama_body(model: &str, request: &GenerationRequest) -> Value {
    json!({
        "model": model,
        "prompt": request.prompt,
        "stream": false,
        "options": {
            "temperature": request.temperature,
            "top_p": request.top_p,
            "num_predict": request.max_tokens,
        }
    })
}

/// Request body for an OpenAI-compatible `/v1/chat/completions`.
fn openai_body(model: &str, request: &GenerationRequest) -> Value {
    json!({
        "model": model,
        "messages": [{"role": "user", "content": request.prompt}],
        "temperature": request.temperature,
        "top_p": request.top_p,
        "max_tokens": request.max_tokens,
        "stream": false,
    })
}

/// Classify a transport error into the engine's failure vocabulary.
/// Free function because both error types are foreign here.
fn map_transport(err: &reqwest::Error, timeout_ms: u64) -> GeneratorError {
    if err.is_timeout() {
        GeneratorError::Timeout(timeout_ms)
    } else if err.is_connect() {
        GeneratorError::Unavailable(err.to_string())
    } else {
        GeneratorError::RequestFailed(err.to_string())
    }
}

fn non_empty(text: &str) -> Result<String, GeneratorError> {
    if text.trim().is_empty() {
        Err(GeneratorError::EmptyReply)
    } else {
        Ok(text.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "say hi".to_owned(),
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 600,
            timeout_ms: 1000,
        }
    }

    #[test]
    fn none_provider_is_always_unavailable() {
        let mut client = LlmClient::none();
        assert!(matches!(
            client.generate(&request()),
            Err(GeneratorError::Unavailable(_))
        ));
    }

    #[test]
    fn ollama_body_carries_sampling_options() {
        let body = ollama_body("llama3", &request());
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["prompt"], "say hi");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 600);
        assert!((body["options"]["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn openai_body_wraps_the_prompt_in_one_user_message() {
        let body = openai_body("gpt-4o-mini", &request());
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "say hi");
        assert_eq!(body["max_tokens"], 600);
    }

    #[test]
    fn empty_bodies_are_their_own_error() {
        assert_eq!(non_empty("   \n"), Err(GeneratorError::EmptyReply));
        assert_eq!(non_empty("ok"), Ok("ok".to_owned()));
    }
}

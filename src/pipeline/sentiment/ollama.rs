use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::prompt::{build_sentiment_prompt, SENTIMENT_TEMPERATURE};
use super::types::SentimentEngine;
use super::ClassifierError;

/// Sentiment classifier backed by a local Ollama chat model.
pub struct OllamaSentimentEngine {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaSentimentEngine {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, ClassifierError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClassifierError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaChatMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaReplyMessage,
}

#[derive(Deserialize)]
struct OllamaReplyMessage {
    content: String,
}

impl SentimentEngine for OllamaSentimentEngine {
    fn analyze(&self, text: &str) -> Result<String, ClassifierError> {
        let url = format!("{}/api/chat", self.base_url);
        let prompt = build_sentiment_prompt(text);
        let body = OllamaChatRequest {
            model: &self.model,
            messages: vec![OllamaChatMessage {
                role: "user",
                content: &prompt,
            }],
            stream: false,
            options: OllamaOptions {
                temperature: SENTIMENT_TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ClassifierError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    ClassifierError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    ClassifierError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClassifierError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .map_err(|e| ClassifierError::ResponseParsing(e.to_string()))?;

        Ok(parsed.message.content)
    }
}

/// Mock classifier for testing. Returns a configured reply and records
/// every text it was asked to analyze.
pub struct MockSentimentEngine {
    reply: Result<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockSentimentEngine {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mock whose every call fails with a connection error.
    pub fn unreachable(base_url: &str) -> Self {
        Self {
            reply: Err(base_url.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl SentimentEngine for MockSentimentEngine {
    fn analyze(&self, text: &str) -> Result<String, ClassifierError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(text.to_string());
        }
        self.reply
            .clone()
            .map_err(ClassifierError::Connection)
    }
}

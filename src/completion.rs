//! External completion service client
//!
//! One HTTP attempt per question, no retries. Replies are decoded into a
//! closed set of known shapes; anything else is `Unrecognized` and the
//! responder falls back to local templates.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CompletionConfig;

/// Persona sent as the system message on every request
pub const SYSTEM_PROMPT: &str = "أنت مساعد قانوني ذكي يتحدث العربية بطلاقة. \
قدّم إجابات قانونية عامة وواضحة ومختصرة باللغة العربية، \
ونبّه المستخدم دائماً إلى أن الإجابة لا تغني عن استشارة محامٍ مختص.";

/// Completion errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompletionError {
    #[error("completion endpoint is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("unrecognized reply shape")]
    UnrecognizedShape,

    #[error("reply too short after cleanup ({0} chars)")]
    TooShort(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Request body for the chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn for_question(config: &CompletionConfig, question: &str) -> Self {
        Self {
            model: config.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(question)],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Known reply shapes of completion services
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionReply {
    /// `choices[0].message.content`
    ChatMessage(String),
    /// `choices[0].text`
    ChoiceText(String),
    /// `generated_text`, bare or as the first element of an array
    GeneratedText(String),
    Response(String),
    Result(String),
    Output(String),
    Unrecognized,
}

#[derive(Deserialize)]
struct RawMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct RawChoice {
    message: Option<RawMessage>,
    text: Option<String>,
}

#[derive(Deserialize)]
struct RawGenerated {
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReply {
    Choices { choices: Vec<RawChoice> },
    Generated(RawGenerated),
    GeneratedBatch(Vec<RawGenerated>),
    Response { response: String },
    Result { result: String },
    Output { output: String },
}

impl CompletionReply {
    pub fn from_value(value: serde_json::Value) -> Self {
        let raw: RawReply = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(_) => return CompletionReply::Unrecognized,
        };

        match raw {
            RawReply::Choices { choices } => match choices.into_iter().next() {
                Some(RawChoice {
                    message: Some(RawMessage { content: Some(content) }),
                    ..
                }) => CompletionReply::ChatMessage(content),
                Some(RawChoice { text: Some(text), .. }) => CompletionReply::ChoiceText(text),
                _ => CompletionReply::Unrecognized,
            },
            RawReply::Generated(g) => CompletionReply::GeneratedText(g.generated_text),
            RawReply::GeneratedBatch(batch) => match batch.into_iter().next() {
                Some(g) => CompletionReply::GeneratedText(g.generated_text),
                None => CompletionReply::Unrecognized,
            },
            RawReply::Response { response } => CompletionReply::Response(response),
            RawReply::Result { result } => CompletionReply::Result(result),
            RawReply::Output { output } => CompletionReply::Output(output),
        }
    }

    /// Reply text, if the shape carried any
    pub fn text(&self) -> Option<&str> {
        match self {
            CompletionReply::ChatMessage(t)
            | CompletionReply::ChoiceText(t)
            | CompletionReply::GeneratedText(t)
            | CompletionReply::Response(t)
            | CompletionReply::Result(t)
            | CompletionReply::Output(t) => Some(t.as_str()),
            CompletionReply::Unrecognized => None,
        }
    }

    pub fn into_text(self) -> Result<String, CompletionError> {
        match self {
            CompletionReply::ChatMessage(t)
            | CompletionReply::ChoiceText(t)
            | CompletionReply::GeneratedText(t)
            | CompletionReply::Response(t)
            | CompletionReply::Result(t)
            | CompletionReply::Output(t) => Ok(t),
            CompletionReply::Unrecognized => Err(CompletionError::UnrecognizedShape),
        }
    }
}

/// Completion backend
pub trait CompletionClient: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply, CompletionError>;
}

/// Blocking HTTP client for an OpenAI-compatible chat-completions endpoint
pub struct HttpCompletionClient {
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        if config.endpoint.trim().is_empty() {
            return Err(CompletionError::NotConfigured);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompletionError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_secs,
            client,
        })
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply, CompletionError> {
        let mut http = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout(self.timeout_secs)
            } else {
                CompletionError::Http(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Status(status.as_u16()));
        }

        let body: serde_json::Value = match response.json() {
            Ok(body) => body,
            Err(e) => {
                debug!("completion body is not JSON: {}", e);
                return Ok(CompletionReply::Unrecognized);
            }
        };

        Ok(CompletionReply::from_value(body))
    }
}

/// Scripted client for tests: replays queued results, repeating the last one
pub struct FakeCompletionClient {
    responses: Mutex<Vec<Result<CompletionReply, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletionClient {
    pub fn new(responses: Vec<Result<CompletionReply, CompletionError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: CompletionReply) -> Self {
        Self::new(vec![Ok(reply)])
    }

    pub fn always_error(error: CompletionError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }
}

impl CompletionClient for FakeCompletionClient {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply, CompletionError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| CompletionError::Http("fake client poisoned".to_string()))?;
        match responses.len() {
            0 => Err(CompletionError::UnrecognizedShape),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

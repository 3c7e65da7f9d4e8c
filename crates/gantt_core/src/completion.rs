//! Chat-completion collaborator.
//!
//! One blocking request per call: no client timeout, no retries. Failures are
//! returned to the caller as [`EndpointError`] for display.

use crate::prompt;
use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("an API key is required to call the completion endpoint")]
    MissingApiKey,
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication failed - check your API key")]
    Unauthorized,
    #[error("access forbidden - insufficient permissions")]
    Forbidden,
    #[error("rate limit or quota exceeded")]
    RateLimited,
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response from completion endpoint: {0}")]
    MalformedResponse(String),
    #[error("completion endpoint returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,
    #[serde(rename = "gpt-4.1")]
    Gpt41,
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
}

impl Model {
    pub const ALL: [Model; 5] = [
        Model::Gpt4oMini,
        Model::Gpt4o,
        Model::Gpt41Mini,
        Model::Gpt41,
        Model::Gpt35Turbo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt4o => "gpt-4o",
            Self::Gpt41Mini => "gpt-4.1-mini",
            Self::Gpt41 => "gpt-4.1",
            Self::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(Model::as_str).collect();
                format!("unknown model '{}' (expected one of: {})", raw.trim(), known.join(", "))
            })
    }
}

/// Opaque credential. Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<K: Into<String>>(key: K) -> Result<Self, EndpointError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(EndpointError::MissingApiKey);
        }
        Ok(Self(key.trim().to_string()))
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: Model,
    pub system: String,
    pub user: String,
    pub temperature: f64,
}

impl CompletionRequest {
    /// Prompt for turning a project description into task records.
    pub fn for_schedule(description: &str, style: Option<&str>, model: Model) -> Self {
        Self {
            model,
            system: prompt::system_instruction(style),
            user: prompt::user_content(description),
            temperature: prompt::DEFAULT_TEMPERATURE,
        }
    }
}

pub trait CompletionClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, EndpointError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completion endpoint.
pub struct OpenAiClient {
    http: Client,
    endpoint: Url,
    api_key: ApiKey,
}

impl OpenAiClient {
    pub fn new(endpoint: &str, api_key: ApiKey) -> Result<Self, EndpointError> {
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|err| EndpointError::InvalidEndpoint(err.to_string()))?;
        let http = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|err| EndpointError::Network(err.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            api_key,
        })
    }

    /// Host part of the endpoint; the only piece of it that gets logged.
    pub fn host(&self) -> &str {
        self.endpoint.host_str().unwrap_or("unknown host")
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, EndpointError> {
        let body = ChatRequest {
            model: request.model.as_str(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
        };

        log::info!(
            "requesting completion from {} (model {}, temperature {})",
            self.host(),
            request.model,
            request.temperature
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .map_err(|err| {
                if err.is_connect() {
                    EndpointError::Network(format!("unable to reach {}", self.host()))
                } else {
                    EndpointError::Network(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(match status.as_u16() {
                401 => EndpointError::Unauthorized,
                403 => EndpointError::Forbidden,
                429 => EndpointError::RateLimited,
                code => EndpointError::Status {
                    status: code,
                    body: body.trim().to_string(),
                },
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|err| EndpointError::MalformedResponse(err.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| EndpointError::MalformedResponse("no choices in response".into()))?;

        let content = content.trim();
        if content.is_empty() {
            return Err(EndpointError::EmptyContent);
        }
        log::debug!("completion returned {} bytes", content.len());
        Ok(content.to_string())
    }
}

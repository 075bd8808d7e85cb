//! Client for the remote language-model endpoint.
//!
//! One POST per generate call, no backoff, no streaming. The service
//! has shipped two reply envelope shapes over time; both are accepted
//! and collapsed into the candidate form before the reply text is
//! extracted.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::BackendConfig;

/// Request body for the generate endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Content blocks; always a single block holding the assembled prompt.
    pub contents: Vec<Content>,
}

impl GenerateRequest {
    /// Wrap an assembled prompt in the envelope the endpoint expects.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
        }
    }
}

/// A content block of text parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// A single text part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One reply candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

/// Normalized reply: always the nested candidate shape, regardless of
/// which envelope version the backend sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Text of the first candidate, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
    }
}

/// The two envelope versions observed from the backend.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReplyEnvelope {
    /// Current shape: nested candidates.
    Candidates { candidates: Vec<Candidate> },
    /// Older shape: a flat reply string.
    Flat { reply: String },
}

/// Collapse either envelope version into the candidate shape.
pub fn normalize(envelope: ReplyEnvelope) -> GenerateResponse {
    match envelope {
        ReplyEnvelope::Candidates { candidates } => GenerateResponse { candidates },
        ReplyEnvelope::Flat { reply } => GenerateResponse {
            candidates: vec![Candidate {
                content: Content {
                    parts: vec![Part { text: reply }],
                },
            }],
        },
    }
}

/// Errors from a backend exchange.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request took too long.
    #[error("request timed out")]
    Timeout,

    /// The endpoint could not be reached.
    #[error("could not connect to the backend")]
    Connect,

    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The reply body did not match either known envelope.
    #[error("could not decode backend reply: {0}")]
    Decode(#[source] reqwest::Error),

    /// The envelope parsed but held no usable text.
    #[error("backend returned an empty reply")]
    EmptyReply,

    /// Any other transport failure.
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A single-shot reply generator.
///
/// The seam the conversation session talks through, so tests can swap
/// the network out entirely.
#[async_trait]
pub trait Generate: Send + Sync {
    /// Send one assembled prompt and return the reply text.
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

/// HTTP implementation of [`Generate`].
pub struct HttpBackend {
    http: Client,
    url: String,
}

impl HttpBackend {
    /// Build a client with the configured request timeout baked in.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(BackendError::Client)?;
        Ok(Self {
            http,
            url: config.endpoint_url(),
        })
    }
}

#[async_trait]
impl Generate for HttpBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let body = GenerateRequest::from_prompt(prompt);

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else if e.is_connect() {
                    BackendError::Connect
                } else {
                    BackendError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ReplyEnvelope = response.json().await.map_err(BackendError::Decode)?;
        let normalized = normalize(envelope);

        match normalized.first_text() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(BackendError::EmptyReply),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest::from_prompt("hello");
        let json = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_normalize_candidate_envelope() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Un byte son 8 bits."}]}}]}"#;
        let envelope: ReplyEnvelope = serde_json::from_str(json).expect("parse envelope");
        assert!(matches!(envelope, ReplyEnvelope::Candidates { .. }));

        let normalized = normalize(envelope);
        assert_eq!(normalized.first_text(), Some("Un byte son 8 bits."));
    }

    #[test]
    fn test_normalize_flat_envelope() {
        let json = r#"{"reply":"Un byte son 8 bits."}"#;
        let envelope: ReplyEnvelope = serde_json::from_str(json).expect("parse envelope");
        assert!(matches!(envelope, ReplyEnvelope::Flat { .. }));

        let normalized = normalize(envelope);
        assert_eq!(normalized.candidates.len(), 1);
        assert_eq!(normalized.first_text(), Some("Un byte son 8 bits."));
    }

    #[test]
    fn test_both_envelopes_normalize_to_same_shape() {
        let nested = normalize(
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"igual"}]}}]}"#)
                .expect("parse nested"),
        );
        let flat =
            normalize(serde_json::from_str(r#"{"reply":"igual"}"#).expect("parse flat"));

        let nested_json = serde_json::to_value(&nested).expect("serialize nested");
        let flat_json = serde_json::to_value(&flat).expect("serialize flat");
        assert_eq!(nested_json, flat_json);
    }

    #[test]
    fn test_empty_candidates_has_no_text() {
        let json = r#"{"candidates":[]}"#;
        let envelope: ReplyEnvelope = serde_json::from_str(json).expect("parse envelope");
        let normalized = normalize(envelope);
        assert_eq!(normalized.first_text(), None);
    }

    #[test]
    fn test_unknown_envelope_is_rejected() {
        let json = r#"{"unexpected":"shape"}"#;
        let result: Result<ReplyEnvelope, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}

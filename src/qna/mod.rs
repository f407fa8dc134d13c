//! Client for a hosted Q&A knowledge base (`generateAnswer` endpoint).
//!
//! Each call POSTs `{"question": ...}` with an `EndpointKey` authorization
//! header and returns the parsed JSON body untouched. There is no timeout
//! and no retry; callers decide what a failure means.

use regex::Regex;
use serde_json::Value;
use url::Url;

pub mod wire;

pub use wire::{QnaAnswer, QnaRequest, QnaResponse};

/// Host the knowledge base is published on.
pub const DEFAULT_BASE_URL: &str = "https://qnamakerbotproject-ml.azurewebsites.net";

/// Route of the knowledge base's `generateAnswer` operation.
pub const DEFAULT_ROUTE: &str =
    "/qnamaker/knowledgebases/19dd10f9-a648-4f0c-bfc7-b4cb617090f5/generateAnswer";

const MAX_ERROR_BODY_CHARS: usize = 256;
const MAX_JSON_ERROR_BODY_CHARS: usize = 2048;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by [`QnaClient`].
#[derive(Debug, thiserror::Error)]
pub enum QnaError {
    /// HTTP transport failure.
    #[error("qna request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("qna service returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitised response body.
        body: String,
    },
    /// The response body was not JSON.
    #[error("qna response parse error: {0}")]
    Parse(String),
    /// The configured base URL or route does not form a valid URL.
    #[error("invalid qna endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl QnaError {
    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::HttpStatus { .. } => "http_status",
            Self::Parse(_) => "parse",
            Self::InvalidUrl(_) => "invalid_url",
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoint key
// ---------------------------------------------------------------------------

/// Authorization key for the knowledge base endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointKey(String);

impl EndpointKey {
    /// Wrap a raw key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("EndpointKey {}", self.0)
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for EndpointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EndpointKey").field(&"[REDACTED]").finish()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client bound to one knowledge base endpoint.
#[derive(Debug, Clone)]
pub struct QnaClient {
    endpoint: Url,
    key: EndpointKey,
    client: reqwest::Client,
}

impl QnaClient {
    /// Build a client for `<base_url><route>`.
    ///
    /// Any path already on `base_url` is kept, so a base of
    /// `https://host/qnamaker` with route `/knowledgebases/kb/generateAnswer`
    /// targets `https://host/qnamaker/knowledgebases/kb/generateAnswer`.
    ///
    /// # Errors
    ///
    /// Returns [`QnaError::InvalidUrl`] if the pieces do not form a URL.
    pub fn new(base_url: &str, route: &str, key: EndpointKey) -> Result<Self, QnaError> {
        let endpoint = endpoint_url(base_url, route)?;
        Ok(Self {
            endpoint,
            key,
            client: reqwest::Client::new(),
        })
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask the knowledge base `question` and return the raw JSON answer.
    ///
    /// # Errors
    ///
    /// Returns [`QnaError`] on transport failure, non-2xx status, or a body
    /// that is not JSON.
    pub async fn generate_answer(&self, question: &str) -> Result<Value, QnaError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("authorization", self.key.header_value())
            .header("content-type", "application/json")
            .json(&QnaRequest { question })
            .send()
            .await?;

        let body = check_http_response(response, &self.key).await?;
        serde_json::from_str(&body).map_err(|e| QnaError::Parse(e.to_string()))
    }
}

fn endpoint_url(base_url: &str, route: &str) -> Result<Url, QnaError> {
    let base = base_url.trim_end_matches('/');
    let route = route.trim_start_matches('/');
    if route.is_empty() {
        return Ok(Url::parse(base)?);
    }
    Ok(Url::parse(&format!("{base}/{route}"))?)
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// A JSON error payload is kept readable (pretty-printed); any other body
/// is collapsed onto one line. Both are redacted and truncated.
///
/// # Errors
///
/// Returns `QnaError::Request` on transport failure, `QnaError::HttpStatus` on non-2xx.
pub async fn check_http_response(
    response: reqwest::Response,
    key: &EndpointKey,
) -> Result<String, QnaError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(QnaError::HttpStatus {
            status: status.as_u16(),
            body: render_error_body(&body, key),
        });
    }
    Ok(body)
}

fn render_error_body(raw: &str, key: &EndpointKey) -> String {
    let pretty = serde_json::from_str::<Value>(raw)
        .ok()
        .filter(|json| json.is_object() || json.is_array())
        .and_then(|json| to_pretty_json(&json).ok());
    match pretty {
        Some(pretty) => truncate(redact_key(pretty, key), MAX_JSON_ERROR_BODY_CHARS),
        None => sanitize_error_body(raw, key),
    }
}

fn sanitize_error_body(raw: &str, key: &EndpointKey) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(redact_key(collapsed, key), MAX_ERROR_BODY_CHARS)
}

fn redact_key(text: String, key: &EndpointKey) -> String {
    let mut redacted = if key.expose().is_empty() {
        text
    } else {
        text.replace(key.expose(), "[REDACTED]")
    };
    if let Ok(regex) = Regex::new(r"(?i)EndpointKey\s+[A-Za-z0-9\-]+") {
        redacted = regex
            .replace_all(&redacted, "EndpointKey [REDACTED]")
            .into_owned();
    }
    redacted
}

fn truncate(text: String, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let shortened = text.chars().take(max_chars).collect::<String>();
        return format!("{shortened}...[truncated]");
    }
    text
}

/// Render a JSON value with four-space indentation.
///
/// # Errors
///
/// Returns [`QnaError::Parse`] if the value cannot be serialised.
pub fn to_pretty_json(value: &Value) -> Result<String, QnaError> {
    use serde::Serialize;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| QnaError::Parse(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| QnaError::Parse(e.to_string()))
}

//! HTTP Transport Layer
//!
//! Narrow transport seam for the token exchange. Production code uses
//! [`ReqwestHttpTransport`]; tests inject [`MockHttpTransport`], which
//! records every outbound request and replays queued responses without
//! touching the network.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{NetworkError, ProtocolError, SocialAuthError, SocialResult};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

impl HttpMethod {
    /// Method name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Request body payload.
#[derive(Clone, Debug, PartialEq)]
pub enum HttpBody {
    /// `application/x-www-form-urlencoded` key/value pairs.
    Form(Vec<(String, String)>),
    /// JSON document.
    Json(Value),
}

/// An outbound HTTP request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL, query string included.
    pub url: String,
    /// Request headers as name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Create a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add a header, builder style.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a body, builder style.
    pub fn with_body(mut self, body: HttpBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Decoded query parameters of the request URL.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url::Url::parse(&self.url)
            .map(|u| {
                u.query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First query parameter with the given name, decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

/// An HTTP response with its body already parsed.
///
/// Token endpoints answer in JSON or form encoding depending on the
/// provider; the transport normalizes both into a [`Value`] so callers
/// never deal with raw bytes.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed response body. `Value::Null` for an empty body; a plain
    /// `Value::String` when the body is neither JSON nor a form.
    pub body: Value,
}

impl HttpResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport abstraction over HTTP.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the parsed response. Non-2xx statuses
    /// are returned as responses, not errors; only transport-level
    /// failures produce an `Err`.
    async fn send(&self, request: HttpRequest) -> SocialResult<HttpResponse>;
}

/// Production transport backed by `reqwest`.
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestHttpTransport {
    /// Create a transport with the default timeout.
    pub fn new() -> Result<Self, SocialAuthError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, SocialAuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            // Token endpoints must answer directly; a redirect is a
            // protocol violation and following one could leak the
            // client secret to an unintended host.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| crate::error::ConfigurationError::HttpClient {
                message: e.to_string(),
            })?;
        Ok(Self { client, timeout })
    }

    fn parse_body(content_type: Option<&str>, text: &str) -> Value {
        if text.is_empty() {
            return Value::Null;
        }
        if let Ok(value) = serde_json::from_str(text) {
            return value;
        }
        let is_form = content_type
            .map(|c| c.contains("application/x-www-form-urlencoded"))
            .unwrap_or(false);
        if is_form {
            let map: serde_json::Map<String, Value> = url::form_urlencoded::parse(text.as_bytes())
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            return Value::Object(map);
        }
        Value::String(text.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn send(&self, request: HttpRequest) -> SocialResult<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder = match request.body {
            Some(HttpBody::Form(pairs)) => builder.form(&pairs),
            Some(HttpBody::Json(value)) => builder.json(&value),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                SocialAuthError::Network(NetworkError::Timeout {
                    timeout: self.timeout,
                })
            } else {
                SocialAuthError::Network(NetworkError::ConnectionFailed {
                    message: e.to_string(),
                })
            }
        })?;

        let status = response.status().as_u16();
        if response.status().is_redirection() {
            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            return Err(SocialAuthError::Protocol(ProtocolError::UnexpectedRedirect {
                location,
            }));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let text = response.text().await.map_err(|e| {
            SocialAuthError::Network(NetworkError::ConnectionFailed {
                message: e.to_string(),
            })
        })?;

        Ok(HttpResponse {
            status,
            body: Self::parse_body(content_type.as_deref(), &text),
        })
    }
}

/// In-memory transport for tests. Records outbound requests and replays
/// queued responses in FIFO order.
#[derive(Default)]
pub struct MockHttpTransport {
    responses: Mutex<Vec<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpTransport {
    /// Create an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to be returned by a later `send`.
    pub fn queue_response(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push(response);
    }

    /// Queue a response with the given status and JSON body.
    pub fn queue_json_response(&self, status: u16, body: Value) {
        self.queue_response(HttpResponse { status, body });
    }

    /// All requests recorded so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent recorded request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Number of requests recorded so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> SocialResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(SocialAuthError::Network(NetworkError::ConnectionFailed {
                message: "no mock response queued".to_string(),
            }));
        }
        Ok(responses.remove(0))
    }
}

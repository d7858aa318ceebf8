//! HTTP transport seam.
//!
//! The client builds an [`HttpRequest`] value and hands it to a
//! [`Transport`]. Production uses [`HttpTransport`] (blocking reqwest, no
//! Tokio runtime required); tests can inject an in-memory double.

use serde::de::DeserializeOwned;

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::StorageError;

/// HTTP verbs used by the Storage API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// File contents sent as `multipart/form-data`.
///
/// Encoded as two form fields: `file_name` (text) and `payload` (binary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartUpload {
    pub file_name: String,
    pub contents: Vec<u8>,
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartUpload),
}

/// One fully-resolved request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub credentials: Credentials,
    pub query: Vec<(String, String)>,
    pub payload: Payload,
}

/// Raw response: status, headers, body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Body as text; invalid UTF-8 is replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, StorageError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| StorageError::MalformedResponse(format!("invalid JSON body: {}", e)))
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations must not interpret the status code: a 404 is a
/// successful `send`. Only transport failures are errors.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, StorageError>;
}

/// Blocking reqwest transport.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, StorageError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorageError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, StorageError> {
        let HttpRequest { method, url, credentials, query, payload } = request;

        let mut req = self.http.request(method.to_reqwest(), &url)
            .basic_auth(credentials.username(), Some(credentials.access_key()));

        if !query.is_empty() {
            req = req.query(&query);
        }

        req = match payload {
            Payload::Empty => req,
            Payload::Json(body) => req.json(&body),
            Payload::Multipart(upload) => {
                let part = reqwest::blocking::multipart::Part::bytes(upload.contents)
                    .file_name(upload.file_name.clone());
                let form = reqwest::blocking::multipart::Form::new()
                    .text("file_name", upload.file_name)
                    .part("payload", part);
                req.multipart(form)
            }
        };

        let response = req.send()
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = header_pairs(response.headers());
        let body = response.bytes()
            .map_err(|e| StorageError::Network(e.to_string()))?
            .to_vec();

        Ok(HttpResponse { status, headers, body })
    }
}

/// Every header, in order. Non-UTF-8 bytes are replaced, never dropped.
fn header_pairs(headers: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
        })
        .collect()
}

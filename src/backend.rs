//! Client for the upstream JSON:API backend.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, IF_MATCH};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use spdlog::{debug, error};

use crate::config;

const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("BaaS API request failed: {message}")]
    Status { status: u16, message: String },
    #[error("BaaS API request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid response from BaaS API: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Empty response from BaaS API")]
    Empty,
}

pub struct BackendRequest<'a> {
    method: Method,
    path: String,
    access_token: Option<&'a str>,
    if_match: Option<&'a str>,
    body: Option<Value>,
}

impl<'a> BackendRequest<'a> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        BackendRequest {
            method,
            path: path.into(),
            access_token: None,
            if_match: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn token(mut self, access_token: Option<&'a str>) -> Self {
        self.access_token = access_token;
        self
    }

    pub fn if_match(mut self, version: Option<&'a str>) -> Self {
        self.if_match = version;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    public_token: Option<String>,
}

impl BackendClient {
    pub fn new(cfg: &config::Backend) -> reqwest::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(BackendClient {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            public_token: cfg.public_token.clone(),
        })
    }

    pub fn public_token(&self) -> Option<&str> {
        self.public_token.as_deref()
    }

    /// Sends the request. `Ok(None)` means the backend answered 204.
    pub async fn send(&self, req: BackendRequest<'_>) -> Result<Option<Value>, BackendError> {
        let url = format!("{}{}", self.base_url, req.path);
        debug!("BaaS API request: {} {}", req.method, url);

        let mut builder = self.http.request(req.method.clone(), &url)
            .header(CONTENT_TYPE, JSON_API_MEDIA_TYPE)
            .header(ACCEPT, JSON_API_MEDIA_TYPE);
        if let Some(token) = req.access_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(version) = req.if_match {
            builder = builder.header(IF_MATCH, format!("\"{}\"", version));
        }
        if let Some(ref body) = req.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response.text().await?;
        if !status.is_success() {
            error!("BaaS API error for {} {}: {} {}", req.method, url, status, text);
            return Err(status_error(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    pub async fn fetch<T: DeserializeOwned>(&self, req: BackendRequest<'_>) -> Result<T, BackendError> {
        match self.send(req).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(BackendError::Empty),
        }
    }
}

fn status_error(status: StatusCode, body: &str) -> BackendError {
    let message = error_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized(message),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => BackendError::Conflict(message),
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        _ => BackendError::Status { status: status.as_u16(), message },
    }
}

/// Picks the most useful message out of a JSON:API error document.
fn error_message(status: StatusCode, body: &str) -> String {
    let fallback = || status.canonical_reason().unwrap_or("Unknown error").to_string();

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    let first_error = value.get("errors").and_then(|e| e.get(0));
    let candidates = [
        first_error.and_then(|e| e.get("detail")),
        first_error.and_then(|e| e.get("title")),
        value.get("error"),
        value.get("message"),
    ];

    let message = candidates.into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(fallback);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_api_error_detail() {
        let body = r#"{"errors":[{"title":"Invalid","detail":"Slug has already been taken"}]}"#;
        assert_eq!(error_message(StatusCode::UNPROCESSABLE_ENTITY, body), "Slug has already been taken");
    }

    #[test]
    fn test_plain_error_field() {
        let body = r#"{"error":"Token expired"}"#;
        assert_eq!(error_message(StatusCode::UNAUTHORIZED, body), "Token expired");
    }

    #[test]
    fn test_empty_detail_skipped() {
        let body = r#"{"errors":[{"detail":"","title":"Stale version"}],"message":"ignored"}"#;
        assert_eq!(error_message(StatusCode::CONFLICT, body), "Stale version");
        assert_eq!(error_message(StatusCode::CONFLICT, r#"{"errors":[]}"#), "Conflict");
    }

    #[test]
    fn test_non_json_body_falls_back_to_reason() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "<html>"), "Bad Gateway");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status_error(StatusCode::UNAUTHORIZED, ""), BackendError::Unauthorized(_)));
        assert!(matches!(status_error(StatusCode::PRECONDITION_FAILED, ""), BackendError::Conflict(_)));
        assert!(matches!(status_error(StatusCode::NOT_FOUND, ""), BackendError::NotFound(_)));
        match status_error(StatusCode::INTERNAL_SERVER_ERROR, "") {
            BackendError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_request_builder() {
        let req = BackendRequest::patch("/api/v1/posts/1")
            .token(Some("abc"))
            .if_match(Some("v1"))
            .json(serde_json::json!({"data": {}}));
        assert_eq!(req.method, Method::PATCH);
        assert_eq!(req.access_token, Some("abc"));
        assert_eq!(req.if_match, Some("v1"));
        assert!(req.body.is_some());
    }
}

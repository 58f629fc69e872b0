//! Request body normalization.
//!
//! Mutating requests may arrive as JSON or as a url-encoded form. Both are read
//! once, before dispatch, into the same flat key/value map so handlers and the
//! CSRF guard never look at the content type again. Any other body is ignored.

use crate::core::shared::error::PlannerError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap},
    Form,
};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Json,
    Form,
    /// No body fields are read; only headers are available.
    Other,
}

impl InputKind {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if content_type.contains("application/json") {
            Self::Json
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            Self::Form
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestInput {
    fields: HashMap<String, String>,
    headers: HeaderMap,
}

impl RequestInput {
    pub fn new(fields: HashMap<String, String>, headers: HeaderMap) -> Self {
        Self { fields, headers }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Field value with surrounding whitespace removed; blank counts as absent.
    pub fn get_trimmed(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[axum::async_trait]
impl<S> FromRequest<S> for RequestInput
where
    S: Send + Sync,
{
    type Rejection = PlannerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers().clone();

        let fields = match InputKind::from_headers(&headers) {
            InputKind::Json => {
                let body = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| PlannerError::BadRequest(e.body_text()))?;
                parse_json_fields(&body)?
            }
            InputKind::Form => {
                let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                    .await
                    .map_err(|e| PlannerError::BadRequest(e.body_text()))?;
                fields
            }
            InputKind::Other => HashMap::new(),
        };

        Ok(Self::new(fields, headers))
    }
}

/// Scalars become strings; nulls, arrays and nested objects are dropped.
/// A body that is empty or not a JSON object yields no fields.
pub fn parse_json_fields(body: &[u8]) -> Result<HashMap<String, String>, PlannerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(HashMap::new());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| PlannerError::BadRequest(format!("Malformed JSON body: {e}")))?;

    let Value::Object(map) = value else {
        return Ok(HashMap::new());
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key, text))
        })
        .collect())
}

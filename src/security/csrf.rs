use crate::core::shared::error::PlannerError;
use crate::core::shared::input::RequestInput;
use rand::Rng;
use tracing::warn;

const TOKEN_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct CsrfConfig {
    pub header_name: String,
    pub form_field_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            header_name: "X-CSRF-Token".into(),
            form_field_name: "csrf".into(),
        }
    }
}

/// The anti-forgery secret bound to one session for its whole lifetime.
#[derive(Debug, Clone)]
pub struct CsrfToken {
    pub token: String,
}

impl CsrfToken {
    pub fn new() -> Self {
        Self {
            token: generate_token(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }
}

impl Default for CsrfToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfValidationResult {
    Valid,
    Missing,
    Invalid,
}

impl CsrfValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::Missing => "CSRF token missing",
            Self::Invalid => "Invalid CSRF token",
        }
    }

    pub fn into_result(self) -> Result<(), PlannerError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(PlannerError::Csrf(self.error_message().to_string()))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsrfManager {
    config: CsrfConfig,
}

impl CsrfManager {
    /// Body field first (JSON or form, as parsed), then the custom header.
    pub fn extract_token<'a>(&self, input: &'a RequestInput) -> Option<&'a str> {
        input
            .get_trimmed(&self.config.form_field_name)
            .or_else(|| {
                input
                    .header(&self.config.header_name)
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
            })
    }

    /// `expected` is the session's token, `None` when the request has no live session.
    pub fn validate(&self, expected: Option<&CsrfToken>, input: &RequestInput) -> CsrfValidationResult {
        let Some(provided) = self.extract_token(input) else {
            return CsrfValidationResult::Missing;
        };

        match expected {
            Some(token) if constant_time_compare(token.as_str(), provided) => {
                CsrfValidationResult::Valid
            }
            _ => CsrfValidationResult::Invalid,
        }
    }

    pub fn verify(&self, expected: Option<&CsrfToken>, input: &RequestInput) -> Result<(), PlannerError> {
        let result = self.validate(expected, input);
        if !result.is_valid() {
            warn!("[CSRF] Rejected request: {}", result.error_message());
        }
        result.into_result()
    }
}

fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..TOKEN_LENGTH).map(|_| rng.random()).collect();
    hex::encode(bytes)
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

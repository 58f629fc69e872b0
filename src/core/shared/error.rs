use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Every failure a single request can hit. None of them is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Csrf(String),
    #[error("Method not allowed")]
    MethodNotAllowed { allow: &'static str },
    #[error("Unknown action")]
    UnknownAction(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("DB error: {0}")]
    Storage(String),
    #[error("Export error: {0}")]
    Export(String),
    #[error("Template error: {0}")]
    Render(String),
}

impl PlannerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            // The page script reads `ok` from the body, so validation stays a 200.
            Self::Validation(_) => StatusCode::OK,
            Self::Csrf(_) => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnknownAction(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Export(_) | Self::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<diesel::result::Error> for PlannerError {
    fn from(e: diesel::result::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for PlannerError {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<tokio::task::JoinError> for PlannerError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Storage(format!("worker failed: {e}"))
    }
}

impl From<csv::Error> for PlannerError {
    fn from(e: csv::Error) -> Self {
        Self::Export(e.to_string())
    }
}

impl From<askama::Error> for PlannerError {
    fn from(e: askama::Error) -> Self {
        Self::Render(e.to_string())
    }
}

impl IntoResponse for PlannerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "ok": false, "error": self.to_string() }));

        match self {
            Self::MethodNotAllowed { allow } => {
                (status, [(header::ALLOW, allow)], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

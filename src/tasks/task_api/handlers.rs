//! HTTP handlers for the planner: one path, dispatched on `?action=`
use crate::core::shared::error::PlannerError;
use crate::core::shared::input::RequestInput;
use crate::core::shared::state::AppState;
use crate::tasks::task_api::{export, html_renderers};
use crate::tasks::types::{parse_task_id, CreateTaskRequest, TaskListResponse};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::Local;
use log::{error, info, warn};
use serde::Deserialize;
use std::sync::Arc;
use tower_cookies::Cookies;

#[derive(Debug, Default, Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Render,
    Add,
    Toggle,
    Delete,
    Export,
    Unknown(String),
}

impl Action {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Render,
            Some("add") => Self::Add,
            Some("toggle") => Self::Toggle,
            Some("delete") => Self::Delete,
            Some("export") => Self::Export,
            Some(other) => Self::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Render => "render",
            Self::Add => "add",
            Self::Toggle => "toggle",
            Self::Delete => "delete",
            Self::Export => "export",
            Self::Unknown(other) => other,
        }
    }
}

pub fn configure_task_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/",
        get(handle_planner_get)
            .post(handle_planner_post)
            .fallback(handle_unsupported_method),
    )
}

/// GET: the page, the CSV export, or 405 for mutating actions.
pub async fn handle_planner_get(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActionQuery>,
    cookies: Cookies,
) -> Response {
    let action = Action::parse(query.action.as_deref());

    let result = match &action {
        Action::Render | Action::Unknown(_) => handle_render(&state, &cookies).await,
        Action::Export => handle_export(&state).await,
        Action::Add | Action::Toggle | Action::Delete => {
            Err(PlannerError::MethodNotAllowed { allow: "POST" })
        }
    };

    finish(&action, result)
}

/// POST: add, toggle and delete, each behind the CSRF check.
pub async fn handle_planner_post(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActionQuery>,
    cookies: Cookies,
    input: RequestInput,
) -> Response {
    let action = Action::parse(query.action.as_deref());

    let result = match &action {
        Action::Render | Action::Export => Err(PlannerError::MethodNotAllowed { allow: "GET" }),
        Action::Unknown(name) => Err(PlannerError::UnknownAction(name.clone())),
        Action::Add | Action::Toggle | Action::Delete => {
            handle_mutation(&state, &cookies, &input, &action).await
        }
    };

    finish(&action, result)
}

pub async fn handle_unsupported_method() -> PlannerError {
    PlannerError::MethodNotAllowed { allow: "GET, POST" }
}

async fn handle_render(state: &AppState, cookies: &Cookies) -> Result<Response, PlannerError> {
    let session = state.sessions.session_for_page(cookies).await;
    let tasks = state.task_engine.list_tasks().await?;
    let html = html_renderers::render_planner_page(session.csrf.as_str(), &tasks)?;
    Ok(Html(html).into_response())
}

async fn handle_export(state: &AppState) -> Result<Response, PlannerError> {
    let tasks = state.task_engine.list_tasks().await?;
    let body = export::tasks_to_csv(&tasks)?;
    let filename = export::export_filename(&Local::now());

    info!("[TASK_EXPORT] Exporting {} task(s) as {}", tasks.len(), filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

async fn handle_mutation(
    state: &AppState,
    cookies: &Cookies,
    input: &RequestInput,
    action: &Action,
) -> Result<Response, PlannerError> {
    let session = state.sessions.session_for_write(cookies).await;
    state
        .csrf
        .verify(session.as_ref().map(|s| &s.csrf), input)?;

    match action {
        Action::Add => {
            state
                .task_engine
                .create_task(create_request_from(input))
                .await?;
        }
        Action::Toggle => {
            let id = parse_task_id(input.get("id"))?;
            state.task_engine.toggle_task(id).await?;
        }
        Action::Delete => {
            let id = parse_task_id(input.get("id"))?;
            state.task_engine.delete_task(id).await?;
        }
        Action::Render | Action::Export | Action::Unknown(_) => {
            return Err(PlannerError::UnknownAction(action.name().to_string()));
        }
    }

    let tasks = state.task_engine.list_tasks().await?;
    Ok(Json(TaskListResponse::new(tasks)).into_response())
}

pub fn create_request_from(input: &RequestInput) -> CreateTaskRequest {
    CreateTaskRequest {
        name: input.get("name").unwrap_or_default().to_string(),
        due_date: input.get("due_date").map(str::to_string),
        subject: input.get("subject").map(str::to_string),
        priority: input.get("priority").map(str::to_string),
    }
}

fn finish(action: &Action, result: Result<Response, PlannerError>) -> Response {
    match result {
        Ok(response) => response,
        Err(e) => {
            match &e {
                PlannerError::Storage(_) | PlannerError::Export(_) | PlannerError::Render(_) => {
                    error!("[TASK_{}] {}", action.name().to_uppercase(), e)
                }
                _ => warn!("[TASK_{}] {}", action.name().to_uppercase(), e),
            }
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use std::collections::HashMap;

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse(None), Action::Render);
        assert_eq!(Action::parse(Some("")), Action::Render);
        assert_eq!(Action::parse(Some("add")), Action::Add);
        assert_eq!(Action::parse(Some("toggle")), Action::Toggle);
        assert_eq!(Action::parse(Some("delete")), Action::Delete);
        assert_eq!(Action::parse(Some("export")), Action::Export);
        assert_eq!(Action::parse(Some("purge")), Action::Unknown("purge".into()));
    }

    #[test]
    fn test_create_request_from_input() {
        let fields: HashMap<String, String> = [
            ("name", "Essay"),
            ("due_date", ""),
            ("priority", "Medium"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let input = RequestInput::new(fields, HeaderMap::new());

        let request = create_request_from(&input);
        assert_eq!(request.name, "Essay");
        assert_eq!(request.due_date.as_deref(), Some(""));
        assert_eq!(request.subject, None);
        assert_eq!(request.priority.as_deref(), Some("Medium"));
    }

    #[tokio::test]
    async fn test_unsupported_method_lists_allowed() {
        let response = handle_unsupported_method().await.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::ALLOW).and_then(|v| v.to_str().ok()),
            Some("GET, POST")
        );
    }
}

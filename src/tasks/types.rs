//! Types for the tasks module
use crate::core::shared::error::PlannerError;
use crate::core::shared::schema::tasks;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Serialize, Serializer};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_SUBJECT_LEN: usize = 255;
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Class name used by the page badges.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Anything that is not exactly `Low`, `Medium` or `High` becomes `Low`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Medium" => Ok(Self::Medium),
            "High" => Ok(Self::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Raw add request as it comes off the wire; nothing is validated yet.
#[derive(Debug, Clone, Default)]
pub struct CreateTaskRequest {
    pub name: String,
    pub due_date: Option<String>,
    pub subject: Option<String>,
    pub priority: Option<String>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTask {
    pub name: String,
    pub due_date: Option<NaiveDate>,
    pub subject: Option<String>,
    pub priority: Priority,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<ValidatedTask, PlannerError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(PlannerError::validation("Task name required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(PlannerError::validation(format!(
                "Task name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        let due_date = match self.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT)
                    .map_err(|_| PlannerError::validation("Invalid due date"))?,
            ),
        };

        let subject = self
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if subject
            .as_ref()
            .is_some_and(|s| s.chars().count() > MAX_SUBJECT_LEN)
        {
            return Err(PlannerError::validation(format!(
                "Subject must be at most {MAX_SUBJECT_LEN} characters"
            )));
        }

        Ok(ValidatedTask {
            name: name.to_string(),
            due_date,
            subject,
            priority: Priority::parse_or_default(self.priority.as_deref()),
        })
    }
}

/// Parses a task id as sent by the page. Only positive integers are accepted.
/// Values past `i64::MAX` saturate; no stored row can carry them.
pub fn parse_task_id(raw: Option<&str>) -> Result<i64, PlannerError> {
    let id = match raw.map(str::trim).map(str::parse::<i64>) {
        Some(Ok(id)) => id,
        Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => i64::MAX,
        _ => return Err(PlannerError::validation("Invalid id")),
    };

    if id > 0 {
        Ok(id)
    } else {
        Err(PlannerError::validation("Invalid id"))
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaskRow {
    pub id: i64,
    pub name: String,
    pub due_date: Option<NaiveDate>,
    pub subject: Option<String>,
    pub priority: String,
    pub completed: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTask<'a> {
    pub name: &'a str,
    pub due_date: Option<NaiveDate>,
    pub subject: Option<&'a str>,
    pub priority: &'a str,
    pub completed: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub due_date: Option<NaiveDate>,
    pub subject: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    #[serde(serialize_with = "serialize_created_at")]
    pub created_at: NaiveDateTime,
}

impl Task {
    pub fn created_at_display(&self) -> String {
        self.created_at.format(CREATED_AT_FORMAT).to_string()
    }
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            due_date: row.due_date,
            subject: row.subject,
            priority: Priority::parse_or_default(Some(&row.priority)),
            completed: row.completed,
            created_at: row.created_at,
        }
    }
}

fn serialize_created_at<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(CREATED_AT_FORMAT))
}

/// Body of every successful mutation.
#[derive(Debug, Clone, Serialize)]
pub struct TaskListResponse {
    pub ok: bool,
    pub tasks: Vec<Task>,
}

impl TaskListResponse {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { ok: true, tasks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            name: name.to_string(),
            ..CreateTaskRequest::default()
        }
    }

    #[test]
    fn test_priority_parsing_is_exact() {
        assert_eq!(Priority::parse_or_default(Some("High")), Priority::High);
        assert_eq!(Priority::parse_or_default(Some("Medium")), Priority::Medium);
        assert_eq!(Priority::parse_or_default(Some("high")), Priority::Low);
        assert_eq!(Priority::parse_or_default(Some("Urgent")), Priority::Low);
        assert_eq!(Priority::parse_or_default(None), Priority::Low);
    }

    #[test]
    fn test_blank_name_rejected() {
        for name in ["", "   ", "\t\n"] {
            let err = request(name).validate().unwrap_err();
            assert!(matches!(err, PlannerError::Validation(ref m) if m == "Task name required"));
        }
    }

    #[test]
    fn test_name_length_limit() {
        assert!(request(&"a".repeat(MAX_NAME_LEN)).validate().is_ok());
        assert!(request(&"a".repeat(MAX_NAME_LEN + 1)).validate().is_err());
    }

    #[test]
    fn test_validate_normalizes_fields() {
        let validated = CreateTaskRequest {
            name: "  History Essay ".into(),
            due_date: Some("2025-03-01".into()),
            subject: Some("   ".into()),
            priority: Some("Nope".into()),
        }
        .validate()
        .expect("valid");

        assert_eq!(validated.name, "History Essay");
        assert_eq!(validated.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(validated.subject, None);
        assert_eq!(validated.priority, Priority::Low);
    }

    #[test]
    fn test_invalid_due_date_rejected() {
        let err = CreateTaskRequest {
            name: "Essay".into(),
            due_date: Some("03/01/2025".into()),
            ..CreateTaskRequest::default()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, PlannerError::Validation(ref m) if m == "Invalid due date"));

        let empty_date = CreateTaskRequest {
            name: "Essay".into(),
            due_date: Some(String::new()),
            ..CreateTaskRequest::default()
        };
        assert_eq!(empty_date.validate().expect("valid").due_date, None);
    }

    #[test]
    fn test_parse_task_id() {
        assert_eq!(parse_task_id(Some("7")).expect("id"), 7);
        assert_eq!(parse_task_id(Some(" 42 ")).expect("id"), 42);
        for bad in [
            None,
            Some(""),
            Some("0"),
            Some("-3"),
            Some("abc"),
            Some("1.5"),
            Some("-99999999999999999999"),
        ] {
            assert!(parse_task_id(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_large_ids_are_valid() {
        assert_eq!(parse_task_id(Some("2147483648")).expect("id"), 2_147_483_648);
        assert_eq!(
            parse_task_id(Some("99999999999999999999")).expect("id"),
            i64::MAX
        );
    }

    #[test]
    fn test_task_serialization() {
        let task = Task {
            id: 1,
            name: "Essay".into(),
            due_date: None,
            subject: Some("History".into()),
            priority: Priority::Medium,
            completed: false,
            created_at: NaiveDate::from_ymd_opt(2025, 2, 20)
                .and_then(|d| d.and_hms_opt(10, 15, 0))
                .expect("timestamp"),
        };

        let json = serde_json::to_value(&task).expect("json");
        assert_eq!(json["priority"], "Medium");
        assert_eq!(json["due_date"], serde_json::Value::Null);
        assert_eq!(json["completed"], false);
        assert_eq!(json["created_at"], "2025-02-20 10:15:00");
    }
}

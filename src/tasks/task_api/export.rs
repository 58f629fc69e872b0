//! CSV export of the task list
use crate::core::shared::error::PlannerError;
use crate::tasks::types::{Task, DUE_DATE_FORMAT};
use chrono::{DateTime, TimeZone};

pub const CSV_HEADER: [&str; 7] = [
    "id",
    "name",
    "due_date",
    "subject",
    "priority",
    "completed",
    "created_at",
];

/// Rows follow the order of `tasks`; absent values are empty cells.
pub fn tasks_to_csv(tasks: &[Task]) -> Result<Vec<u8>, PlannerError> {
    let mut csv_writer = csv::Writer::from_writer(vec![]);

    csv_writer.write_record(CSV_HEADER)?;

    for task in tasks {
        csv_writer.write_record([
            task.id.to_string(),
            task.name.clone(),
            task.due_date
                .map(|d| d.format(DUE_DATE_FORMAT).to_string())
                .unwrap_or_default(),
            task.subject.clone().unwrap_or_default(),
            task.priority.to_string(),
            if task.completed { "1" } else { "0" }.to_string(),
            task.created_at_display(),
        ])?;
    }

    csv_writer
        .into_inner()
        .map_err(|e| PlannerError::Export(e.to_string()))
}

pub fn export_filename<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("tasks_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

//! HTML rendering for the planner page
use crate::core::shared::error::PlannerError;
use crate::tasks::types::Task;
use askama::Template;

/// Size of the "upcoming" panel.
pub const UPCOMING_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
        }
    }
}

/// Incomplete tasks that have a due date, soonest first, at most six.
pub fn upcoming_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut upcoming: Vec<&Task> = tasks
        .iter()
        .filter(|t| !t.completed && t.due_date.is_some())
        .collect();
    upcoming.sort_by_key(|t| t.due_date);
    upcoming.truncate(UPCOMING_LIMIT);
    upcoming
}

#[derive(Template)]
#[template(path = "planner.html")]
pub struct PlannerTemplate<'a> {
    pub csrf_token: &'a str,
    pub tasks: &'a [Task],
    pub upcoming: Vec<&'a Task>,
    pub stats: TaskStats,
}

impl<'a> PlannerTemplate<'a> {
    pub fn new(csrf_token: &'a str, tasks: &'a [Task]) -> Self {
        Self {
            csrf_token,
            tasks,
            upcoming: upcoming_tasks(tasks),
            stats: TaskStats::from_tasks(tasks),
        }
    }
}

pub fn render_planner_page(csrf_token: &str, tasks: &[Task]) -> Result<String, PlannerError> {
    Ok(PlannerTemplate::new(csrf_token, tasks).render()?)
}

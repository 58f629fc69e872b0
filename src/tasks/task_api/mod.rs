//! Task API module
//!
//! - engine: TaskEngine, persistence and ordering
//! - handlers: HTTP dispatch on `?action=`
//! - html_renderers: the server-rendered page
//! - export: CSV export

pub mod engine;
pub mod export;
pub mod handlers;
pub mod html_renderers;

pub use engine::TaskEngine;
pub use handlers::{configure_task_routes, handle_planner_get, handle_planner_post};

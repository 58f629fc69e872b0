pub mod task_api;
pub mod types;

pub use task_api::{configure_task_routes, TaskEngine};
pub use types::{CreateTaskRequest, Priority, Task, TaskListResponse};

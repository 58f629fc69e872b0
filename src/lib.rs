pub mod core;
pub mod embedded_ui;
pub mod main_module;
pub mod security;
pub mod tasks;

pub use crate::core::config::AppConfig;
pub use crate::core::shared::error::PlannerError;
pub use crate::core::shared::state::AppState;
pub use crate::main_module::build_router;

use crate::core::config::AppConfig;
use crate::core::session::SessionManager;
use crate::core::shared::utils::DbPool;
use crate::security::csrf::CsrfManager;
use crate::tasks::TaskEngine;

/// Shared by every request handler behind an `Arc`.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub task_engine: TaskEngine,
    pub sessions: SessionManager,
    pub csrf: CsrfManager,
}

impl AppState {
    pub fn new(config: AppConfig, conn: DbPool) -> Self {
        let sessions = SessionManager::new(config.session.clone());
        Self {
            task_engine: TaskEngine::new(conn),
            sessions,
            csrf: CsrfManager::default(),
            config,
        }
    }
}

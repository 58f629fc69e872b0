use crate::core::config::DatabaseConfig;
use crate::core::shared::error::PlannerError;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pragmas applied to every pooled SQLite connection on checkout.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL;",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn create_conn(config: &DatabaseConfig) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(config.url.as_str());
    Pool::builder()
        .max_size(config.max_connections)
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)
}

/// Creates the `tasks` table when missing. Safe to call on every start.
pub fn run_migrations(pool: &DbPool) -> Result<(), PlannerError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PlannerError::Storage(format!("Migration error: {e}")))?;
    if !applied.is_empty() {
        log::info!("[DB] Applied {} migration(s)", applied.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DatabaseConfig {
            url: dir.path().join("planner.db").to_string_lossy().into_owned(),
            max_connections: 2,
        };
        let pool = create_conn(&config).expect("pool");

        run_migrations(&pool).expect("first run");
        run_migrations(&pool).expect("second run");
    }
}

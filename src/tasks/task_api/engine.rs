//! Task engine - persistence and ordering of the `tasks` table
use crate::core::shared::error::PlannerError;
use crate::core::shared::schema::tasks;
use crate::core::shared::utils::{run_migrations, DbPool};
use crate::tasks::types::{CreateTaskRequest, NewTask, Task, TaskRow};
use chrono::{Timelike, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{error, info};

#[derive(Debug, Clone)]
pub struct TaskEngine {
    db: DbPool,
}

impl TaskEngine {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Ensures the table exists. Idempotent.
    pub async fn initialize(&self) -> Result<(), PlannerError> {
        let pool = self.db.clone();
        tokio::task::spawn_blocking(move || run_migrations(&pool)).await?
    }

    /// Incomplete first; dated before undated; earliest due date first; newest first.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, PlannerError> {
        self.with_conn(|conn| {
            let rows = tasks::table
                .select(TaskRow::as_select())
                .order((
                    tasks::completed.asc(),
                    tasks::due_date.is_null().asc(),
                    tasks::due_date.asc(),
                    tasks::created_at.desc(),
                    tasks::id.desc(),
                ))
                .load::<TaskRow>(conn)?;
            Ok(rows.into_iter().map(Task::from).collect())
        })
        .await
    }

    /// Validates and inserts; returns the id assigned by the store.
    pub async fn create_task(&self, request: CreateTaskRequest) -> Result<i64, PlannerError> {
        let task = request.validate()?;

        let id = self
            .with_conn(move |conn| {
                let now = Utc::now().naive_utc();
                let created_at = now.with_nanosecond(now.nanosecond() / 1_000 * 1_000).unwrap_or(now);

                let new_task = NewTask {
                    name: &task.name,
                    due_date: task.due_date,
                    subject: task.subject.as_deref(),
                    priority: task.priority.as_str(),
                    completed: false,
                    created_at,
                };

                let id = diesel::insert_into(tasks::table)
                    .values(&new_task)
                    .returning(tasks::id)
                    .get_result::<i64>(conn)?;
                Ok(id)
            })
            .await?;

        info!("[TASK_ADD] Created task {}", id);
        Ok(id)
    }

    /// Flips `completed` in a single statement. A missing id is not an error.
    pub async fn toggle_task(&self, id: i64) -> Result<(), PlannerError> {
        ensure_positive(id)?;

        let affected = self
            .with_conn(move |conn| {
                let affected = diesel::update(tasks::table.find(id))
                    .set(tasks::completed.eq(diesel::dsl::not(tasks::completed)))
                    .execute(conn)?;
                Ok(affected)
            })
            .await?;

        info!("[TASK_TOGGLE] Task {} toggled ({} row)", id, affected);
        Ok(())
    }

    /// Hard delete. A missing id is not an error.
    pub async fn delete_task(&self, id: i64) -> Result<(), PlannerError> {
        ensure_positive(id)?;

        let affected = self
            .with_conn(move |conn| {
                let affected = diesel::delete(tasks::table.find(id)).execute(conn)?;
                Ok(affected)
            })
            .await?;

        info!("[TASK_DELETE] Task {} deleted ({} row)", id, affected);
        Ok(())
    }

    pub async fn count_tasks(&self) -> Result<i64, PlannerError> {
        self.with_conn(|conn| Ok(tasks::table.count().get_result::<i64>(conn)?))
            .await
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, PlannerError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, PlannerError> + Send + 'static,
    {
        let pool = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                error!("[TASK_ENGINE] DB connection error: {}", e);
                PlannerError::from(e)
            })?;
            f(&mut conn)
        })
        .await?
    }
}

fn ensure_positive(id: i64) -> Result<(), PlannerError> {
    if id > 0 {
        Ok(())
    } else {
        Err(PlannerError::validation("Invalid id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DatabaseConfig;
    use crate::core::shared::utils::create_conn;
    use crate::tasks::types::Priority;
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    async fn test_engine() -> (TaskEngine, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DatabaseConfig {
            url: dir.path().join("tasks.db").to_string_lossy().into_owned(),
            max_connections: 2,
        };
        let engine = TaskEngine::new(create_conn(&config).expect("pool"));
        engine.initialize().await.expect("initialize");
        (engine, dir)
    }

    fn request(name: &str, due: Option<NaiveDate>, priority: Option<&str>) -> CreateTaskRequest {
        CreateTaskRequest {
            name: name.to_string(),
            due_date: due.map(|d| d.format("%Y-%m-%d").to_string()),
            subject: None,
            priority: priority.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_initialize_twice() {
        let (engine, _dir) = test_engine().await;
        engine.initialize().await.expect("second initialize");
        assert_eq!(engine.count_tasks().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn test_blank_name_leaves_store_unchanged() {
        let (engine, _dir) = test_engine().await;
        engine.create_task(request("Essay", None, None)).await.expect("add");

        let err = engine.create_task(request("   ", None, None)).await.unwrap_err();
        assert!(matches!(err, PlannerError::Validation(_)));
        assert_eq!(engine.count_tasks().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn test_unknown_priority_stored_as_low() {
        let (engine, _dir) = test_engine().await;
        engine
            .create_task(request("Quiz", None, Some("Critical")))
            .await
            .expect("add");

        let tasks = engine.list_tasks().await.expect("list");
        assert_eq!(tasks[0].priority, Priority::Low);
        assert!(!tasks[0].completed);
    }

    #[tokio::test]
    async fn test_list_ordering() {
        let (engine, _dir) = test_engine().await;
        let today = Utc::now().date_naive();

        let c = engine
            .create_task(request("C", Some(today - Duration::days(1)), None))
            .await
            .expect("add c");
        let b = engine.create_task(request("B", None, None)).await.expect("add b");
        let a = engine
            .create_task(request("A", Some(today + Duration::days(1)), None))
            .await
            .expect("add a");
        engine.toggle_task(c).await.expect("complete c");

        let ids: Vec<i64> = engine
            .list_tasks()
            .await
            .expect("list")
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[tokio::test]
    async fn test_ordering_within_groups() {
        let (engine, _dir) = test_engine().await;
        let today = Utc::now().date_naive();

        let later = engine
            .create_task(request("later", Some(today + Duration::days(5)), None))
            .await
            .expect("add");
        let sooner = engine
            .create_task(request("sooner", Some(today + Duration::days(2)), None))
            .await
            .expect("add");
        let undated_old = engine.create_task(request("old", None, None)).await.expect("add");
        let undated_new = engine.create_task(request("new", None, None)).await.expect("add");

        let ids: Vec<i64> = engine
            .list_tasks()
            .await
            .expect("list")
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![sooner, later, undated_new, undated_old]);
    }

    #[tokio::test]
    async fn test_toggle_flips_and_missing_id_is_noop() {
        let (engine, _dir) = test_engine().await;
        let id = engine.create_task(request("Essay", None, None)).await.expect("add");

        engine.toggle_task(id).await.expect("toggle");
        assert!(engine.list_tasks().await.expect("list")[0].completed);

        engine.toggle_task(id).await.expect("toggle back");
        assert!(!engine.list_tasks().await.expect("list")[0].completed);

        let before = engine.list_tasks().await.expect("list");
        engine.toggle_task(id + 100).await.expect("missing id");
        assert_eq!(engine.list_tasks().await.expect("list"), before);
    }

    #[tokio::test]
    async fn test_ids_beyond_32_bits_are_misses() {
        let (engine, _dir) = test_engine().await;
        engine.create_task(request("Essay", None, None)).await.expect("add");
        let before = engine.list_tasks().await.expect("list");

        engine.toggle_task(2_147_483_648).await.expect("toggle");
        engine.delete_task(i64::MAX).await.expect("delete");

        assert_eq!(engine.list_tasks().await.expect("list"), before);
    }

    #[tokio::test]
    async fn test_non_positive_id_rejected() {
        let (engine, _dir) = test_engine().await;
        assert!(matches!(
            engine.toggle_task(0).await,
            Err(PlannerError::Validation(_))
        ));
        assert!(matches!(
            engine.delete_task(-1).await,
            Err(PlannerError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_only_that_id() {
        let (engine, _dir) = test_engine().await;
        let keep = engine.create_task(request("keep", None, None)).await.expect("add");
        let gone = engine.create_task(request("gone", None, None)).await.expect("add");

        engine.delete_task(gone).await.expect("delete");
        let ids: Vec<i64> = engine
            .list_tasks()
            .await
            .expect("list")
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![keep]);

        engine.delete_task(gone).await.expect("second delete");
        engine.toggle_task(gone).await.expect("toggle deleted");
        assert_eq!(engine.count_tasks().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let (engine, _dir) = test_engine().await;
        let first = engine.create_task(request("one", None, None)).await.expect("add");
        engine.delete_task(first).await.expect("delete");

        let second = engine.create_task(request("two", None, None)).await.expect("add");
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_fields_round_trip_through_store() {
        let (engine, _dir) = test_engine().await;
        let due = NaiveDate::from_ymd_opt(2030, 6, 15).expect("date");
        engine
            .create_task(CreateTaskRequest {
                name: " Lab report ".into(),
                due_date: Some("2030-06-15".into()),
                subject: Some("Chemistry".into()),
                priority: Some("High".into()),
            })
            .await
            .expect("add");

        let task = &engine.list_tasks().await.expect("list")[0];
        assert_eq!(task.name, "Lab report");
        assert_eq!(task.due_date, Some(due));
        assert_eq!(task.subject.as_deref(), Some("Chemistry"));
        assert_eq!(task.priority, Priority::High);
    }
}

/// Task model and database operations
///
/// A task is a unit of field work reported by a technician (or manager) on
/// their own behalf. Every task is owned by exactly one user.
///
/// # Status
///
/// ```text
/// opened → closed
/// ```
///
/// Tasks are created `opened`. No operation in this crate closes a task; the
/// status exists so stored rows from other tools round-trip.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('opened', 'closed');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ,
///     user_id BIGINT NOT NULL REFERENCES users(id),
///     summary VARCHAR(2500) NOT NULL,
///     status task_status NOT NULL DEFAULT 'opened'
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use fieldtask_shared::models::task::{NewTask, Task, TaskFilter};
/// use fieldtask_shared::store::Pagination;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, NewTask {
///     user_id: 1,
///     summary: "Replaced the pump seal".to_string(),
/// }).await?;
///
/// let own = Task::list(&pool, Pagination::new(10, 0), &TaskFilter::owned_by(1)).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::fmt;

use crate::store::Pagination;

/// Longest summary accepted, in characters
pub const SUMMARY_MAX_LEN: usize = 2500;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is open (initial state)
    #[default]
    Opened,

    /// Task has been closed
    Closed,
}

impl TaskStatus {
    /// Converts status to string for storage and display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Opened => "opened",
            TaskStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID, assigned by the store
    pub id: i64,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,

    /// Owning user
    pub user_id: i64,

    /// Free-text description (1-2500 characters)
    pub summary: String,

    /// Current status
    pub status: TaskStatus,
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owner; must reference an existing user
    pub user_id: i64,

    pub summary: String,
}

/// Optional conditions applied when listing tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks owned by this user
    pub user_id: Option<i64>,
}

impl TaskFilter {
    /// Filter selecting the tasks of a single owner
    pub fn owned_by(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Checks whether a task passes the filter
    pub fn matches(&self, task: &Task) -> bool {
        self.user_id.map_or(true, |id| task.user_id == id)
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        query.push(" WHERE deleted_at IS NULL");
        if let Some(user_id) = self.user_id {
            query.push(" AND user_id = ").push_bind(user_id);
        }
    }
}

const TASK_COLUMNS: &str = "id, created_at, updated_at, deleted_at, user_id, summary, status";

impl Task {
    /// Inserts a new task in the `opened` status
    ///
    /// # Errors
    ///
    /// Returns a database error carrying SQLSTATE `23503` when `user_id`
    /// does not reference an existing user
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, summary, status)
            VALUES ($1, $2, $3)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.user_id)
        .bind(data.summary)
        .bind(TaskStatus::Opened)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks matching `filter`, newest first
    pub async fn list(
        pool: &PgPool,
        page: Pagination,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));
        filter.push_conditions(&mut query);
        query.push(" ORDER BY created_at DESC, id DESC");
        page.push_clauses(&mut query);

        query.build_query_as::<Task>().fetch_all(pool).await
    }

    /// Counts tasks matching `filter`
    pub async fn count(pool: &PgPool, filter: &TaskFilter) -> Result<i64, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(id) FROM tasks");
        filter.push_conditions(&mut query);

        let (total,) = query.build_query_as::<(i64,)>().fetch_one(pool).await?;
        Ok(total)
    }
}

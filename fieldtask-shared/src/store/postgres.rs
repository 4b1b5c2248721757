/// PostgreSQL-backed store
///
/// Thin adapter from the store traits to the model queries in
/// [`crate::models`], translating `sqlx` failures into [`StoreError`].
///
/// # Example
///
/// ```no_run
/// use fieldtask_shared::db::pool::{create_pool, DatabaseConfig};
/// use fieldtask_shared::store::postgres::PgStore;
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let pool = create_pool(DatabaseConfig {
///     url: "postgresql://localhost/fieldtask".to_string(),
///     ..Default::default()
/// }).await?;
/// let store = PgStore::new(pool);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{HealthProbe, Page, Pagination, StoreError, StoreResult, TaskStore, UserStore};
use crate::db::pool::health_check;
use crate::models::task::{NewTask, Task, TaskFilter};
use crate::models::user::{NewUser, User, UserFilter};

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

/// Store over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn user_not_found() -> StoreError {
    StoreError::NotFound("user not found".to_string())
}

/// Maps constraint violations to their domain errors
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => {
                return StoreError::ForeignKeyConstraint("user not found".to_string())
            }
            Some(UNIQUE_VIOLATION) => {
                return StoreError::Conflict("username already exists".to_string())
            }
            _ => {}
        }
    }

    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        User::create(&self.pool, data).await.map_err(classify)
    }

    async fn get_user_by_id(&self, id: i64) -> StoreResult<User> {
        User::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(user_not_found)
    }

    async fn get_user_by_username_and_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> StoreResult<User> {
        User::find_by_credentials(&self.pool, username, password_hash)
            .await?
            .ok_or_else(user_not_found)
    }

    async fn list_users(&self, page: Pagination, filter: &UserFilter) -> StoreResult<Page<User>> {
        let items = User::list(&self.pool, page, filter).await?;
        let total = User::count(&self.pool, filter).await?;
        debug!(count = items.len(), total, "Listed users");

        Ok(Page { items, total })
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        Task::create(&self.pool, data).await.map_err(classify)
    }

    async fn list_tasks(&self, page: Pagination, filter: &TaskFilter) -> StoreResult<Page<Task>> {
        let items = Task::list(&self.pool, page, filter).await?;
        let total = Task::count(&self.pool, filter).await?;
        debug!(count = items.len(), total, "Listed tasks");

        Ok(Page { items, total })
    }
}

#[async_trait]
impl HealthProbe for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_passes_other_errors_through() {
        let err = classify(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}

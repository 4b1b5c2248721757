/// Persistence contracts for FieldTask
///
/// Services talk to storage only through the traits in this module. Two
/// implementations ship with the crate:
///
/// - [`postgres::PgStore`]: the production store over a `PgPool`
/// - [`memory::MemoryStore`]: an in-process store for tests and local demos
///
/// # Pagination
///
/// Listings take a [`Pagination`]. A zero `limit` means "no limit" and a zero
/// `offset` means "no offset", so [`Pagination::UNBOUNDED`] returns every
/// matching row. `total` in a [`Page`] always counts the rows matching the
/// filter, independent of the window.
///
/// # Example
///
/// ```no_run
/// use fieldtask_shared::models::user::UserFilter;
/// use fieldtask_shared::store::{memory::MemoryStore, Pagination, UserStore};
///
/// # async fn example() -> Result<(), fieldtask_shared::store::StoreError> {
/// let store = MemoryStore::new();
/// let managers = store
///     .list_users(Pagination::UNBOUNDED, &UserFilter::managers())
///     .await?;
/// println!("{} managers", managers.total);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use std::fmt;

use crate::models::task::{NewTask, Task, TaskFilter};
use crate::models::user::{NewUser, User, UserFilter};

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Lookup miss
    #[error("{0}")]
    NotFound(String),

    /// Referential integrity violation
    #[error("{0}")]
    ForeignKeyConstraint(String),

    /// Unique constraint violation
    #[error("{0}")]
    Conflict(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store cannot serve requests right now
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Limit/offset window applied to listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    /// Sentinel window returning every row
    pub const UNBOUNDED: Pagination = Pagination {
        limit: 0,
        offset: 0,
    };

    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Appends `LIMIT`/`OFFSET` clauses, skipping zero values
    pub fn push_clauses(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if self.limit > 0 {
            query.push(" LIMIT ").push_bind(self.limit);
        }
        if self.offset > 0 {
            query.push(" OFFSET ").push_bind(self.offset);
        }
    }

    /// Applies the window to an already filtered iterator
    pub fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        let skipped = items.skip(self.offset.max(0) as usize);
        if self.limit > 0 {
            skipped.take(self.limit as usize).collect()
        } else {
            skipped.collect()
        }
    }
}

/// One window of a listing plus the filtered row count
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync + fmt::Debug {
    /// Persists a user whose password is already hashed
    async fn create_user(&self, data: NewUser) -> StoreResult<User>;

    /// Fails with [`StoreError::NotFound`] on a miss
    async fn get_user_by_id(&self, id: i64) -> StoreResult<User>;

    /// Fails with [`StoreError::NotFound`] when no live user has this
    /// username and password hash
    async fn get_user_by_username_and_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> StoreResult<User>;

    async fn list_users(&self, page: Pagination, filter: &UserFilter) -> StoreResult<Page<User>>;
}

/// Task persistence
#[async_trait]
pub trait TaskStore: Send + Sync + fmt::Debug {
    /// Fails with [`StoreError::ForeignKeyConstraint`] when the owner does
    /// not exist
    async fn create_task(&self, data: NewTask) -> StoreResult<Task>;

    async fn list_tasks(&self, page: Pagination, filter: &TaskFilter) -> StoreResult<Page<Task>>;
}

/// Liveness probe for the backing store
#[async_trait]
pub trait HealthProbe: Send + Sync + fmt::Debug {
    async fn ping(&self) -> StoreResult<()>;
}

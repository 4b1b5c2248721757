/// In-memory store
///
/// Implements every store trait over a `tokio::sync::RwLock`, with the same
/// observable semantics as the PostgreSQL store: sequential IDs starting at
/// 1, unique usernames, foreign key enforcement on task owners, soft-delete
/// exclusion, and identical limit/offset handling.
///
/// Listings keep the database ordering: users by ID, tasks newest first.
///
/// # Example
///
/// ```
/// use fieldtask_shared::models::user::{NewUser, UserRole};
/// use fieldtask_shared::store::{memory::MemoryStore, UserStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryStore::new();
/// let user = store.create_user(NewUser {
///     username: "jdoe".to_string(),
///     email: "jdoe@example.com".to_string(),
///     password: "hash".to_string(),
///     role: UserRole::Technician,
/// }).await.unwrap();
/// assert_eq!(user.id, 1);
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{HealthProbe, Page, Pagination, StoreError, StoreResult, TaskStore, UserStore};
use crate::models::task::{NewTask, Task, TaskFilter, TaskStatus};
use crate::models::user::{NewUser, User, UserFilter};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    tasks: Vec<Task>,
}

/// Store held entirely in process memory
///
/// Cloning is cheap and clones share the same tables.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    healthy: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Toggles the result of [`HealthProbe::ping`]
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Snapshot of every stored task, including soft-deleted ones
    pub async fn tasks(&self) -> Vec<Task> {
        self.tables.read().await.tasks.clone()
    }
}

fn user_not_found() -> StoreError {
    StoreError::NotFound("user not found".to_string())
}

fn next_id(len: usize) -> i64 {
    len as i64 + 1
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == data.username) {
            return Err(StoreError::Conflict("username already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: next_id(tables.users.len()),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            username: data.username,
            email: data.email,
            password: data.password,
            role: data.role,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> StoreResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned()
            .ok_or_else(user_not_found)
    }

    async fn get_user_by_username_and_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> StoreResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|u| {
                u.username == username && u.password == password_hash && u.deleted_at.is_none()
            })
            .cloned()
            .ok_or_else(user_not_found)
    }

    async fn list_users(&self, page: Pagination, filter: &UserFilter) -> StoreResult<Page<User>> {
        let tables = self.tables.read().await;
        let matching: Vec<&User> = tables
            .users
            .iter()
            .filter(|u| u.deleted_at.is_none() && filter.matches(u))
            .collect();

        Ok(Page {
            total: matching.len() as i64,
            items: page.apply(matching.into_iter().cloned()),
        })
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        if !tables.users.iter().any(|u| u.id == data.user_id) {
            return Err(StoreError::ForeignKeyConstraint("user not found".to_string()));
        }

        let now = Utc::now();
        let task = Task {
            id: next_id(tables.tasks.len()),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            user_id: data.user_id,
            summary: data.summary,
            status: TaskStatus::Opened,
        };
        tables.tasks.push(task.clone());

        Ok(task)
    }

    async fn list_tasks(&self, page: Pagination, filter: &TaskFilter) -> StoreResult<Page<Task>> {
        let tables = self.tables.read().await;
        let matching: Vec<&Task> = tables
            .tasks
            .iter()
            .rev()
            .filter(|t| t.deleted_at.is_none() && filter.matches(t))
            .collect();

        Ok(Page {
            total: matching.len() as i64,
            items: page.apply(matching.into_iter().cloned()),
        })
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store marked unhealthy".to_string()))
        }
    }
}

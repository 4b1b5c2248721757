/// Manager notification fan-out
///
/// After a task is saved, every manager receives one [`Notification`]
/// naming the user who performed the task and carrying the task and its
/// summary, truncated to a configured number of
/// characters with `...` appended when it was cut.
///
/// # Delivery
///
/// ```text
/// POST /api/tasks ──► create task ──► 201
///                          │
///                          └─ spawn ─► list managers ─► look up owner ─► emit × N
/// ```
///
/// [`NotificationService::spawn`] detaches the fan-out on the Tokio runtime.
/// Delivery is best effort: there is no retry, no queue and no bound on the
/// number of fan-outs in flight. If listing managers or looking up the task
/// owner fails, nothing is emitted and the failure is only logged.
///
/// # Example
///
/// ```
/// use fieldtask_shared::services::notification::truncate_summary;
///
/// assert_eq!(truncate_summary("short", 30), "short");
/// assert_eq!(truncate_summary("abcdef", 3), "abc...");
/// ```

use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::user::UserService;
use super::ServiceResult;
use crate::models::task::Task;
use crate::models::user::{User, UserFilter};
use crate::store::Pagination;

/// Marker appended to a truncated summary
pub const ELLIPSIS: &str = "...";

/// One notification addressed to one manager
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub recipient: User,

    /// User who performed the task
    pub owner: User,

    pub task: Task,

    /// Task summary after truncation
    pub summary: String,
}

/// Destination for notifications
///
/// Emitting must not block materially; callers rely on nothing beyond that.
pub trait NotificationSink: Send + Sync + std::fmt::Debug {
    fn emit(&self, notification: Notification);
}

/// Sink writing each notification as one structured `INFO` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn emit(&self, notification: Notification) {
        let Notification {
            recipient,
            owner,
            task,
            summary,
        } = notification;

        info!(
            recipient_id = recipient.id,
            recipient_username = %recipient.username,
            task_user_id = task.user_id,
            task_username = %owner.username,
            task_id = task.id,
            task_status = %task.status,
            task_created_at = %task.created_at,
            task_updated_at = %task.updated_at,
            summary = %summary,
            "Task saved"
        );
    }
}

/// Sink recording notifications in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for MemorySink {
    fn emit(&self, notification: Notification) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
    }
}

/// Cuts `summary` to `max_len` characters, appending [`ELLIPSIS`] if cut
pub fn truncate_summary(summary: &str, max_len: usize) -> String {
    match summary.char_indices().nth(max_len) {
        Some((end, _)) => format!("{}{ELLIPSIS}", &summary[..end]),
        None => summary.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct NotificationService {
    users: UserService,
    sink: Arc<dyn NotificationSink>,
    summary_max_len: usize,
}

impl NotificationService {
    pub fn new(users: UserService, sink: Arc<dyn NotificationSink>, summary_max_len: usize) -> Self {
        Self {
            users,
            sink,
            summary_max_len,
        }
    }

    /// Notifies every manager that `task` was saved
    ///
    /// Returns the number of notifications emitted.
    ///
    /// # Errors
    ///
    /// Fails without emitting anything if the managers cannot be listed or
    /// the task owner cannot be found
    pub async fn notify_managers_on_task_saved(&self, task: &Task) -> ServiceResult<usize> {
        let managers = self
            .users
            .list_users(Pagination::UNBOUNDED, &UserFilter::managers())
            .await?;
        let owner = self.users.get_user_by_id(task.user_id).await?;

        let summary = truncate_summary(&task.summary, self.summary_max_len);
        for manager in &managers.items {
            self.sink.emit(Notification {
                recipient: manager.clone(),
                owner: owner.clone(),
                task: task.clone(),
                summary: summary.clone(),
            });
        }

        debug!(task_id = task.id, notified = managers.len(), "Managers notified");
        Ok(managers.len())
    }

    /// Runs the fan-out in the background
    ///
    /// The returned handle may be dropped; failures are logged, never
    /// propagated.
    pub fn spawn(&self, task: Task) -> JoinHandle<()> {
        let service = self.clone();

        tokio::spawn(async move {
            if let Err(e) = service.notify_managers_on_task_saved(&task).await {
                error!(
                    trace = "service.notification.notify_managers_on_task_saved",
                    task_id = task.id,
                    error = %e,
                    "Failed to notify managers"
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::CredentialHasher;
    use crate::models::task::NewTask;
    use crate::models::user::{NewUser, UserRole};
    use crate::services::ServiceError;
    use crate::store::memory::MemoryStore;
    use crate::store::{TaskStore, UserStore};

    async fn add_user(store: &MemoryStore, username: &str, role: UserRole) -> User {
        store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "hash".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    async fn setup() -> (MemoryStore, MemorySink, NotificationService) {
        let store = MemoryStore::new();
        add_user(&store, "boss1", UserRole::Manager).await;
        add_user(&store, "tech1", UserRole::Technician).await;
        add_user(&store, "boss2", UserRole::Manager).await;

        let sink = MemorySink::new();
        let users = UserService::new(
            Arc::new(store.clone()),
            Arc::new(CredentialHasher::new("key")),
        );
        let service = NotificationService::new(users, Arc::new(sink.clone()), 30);

        (store, sink, service)
    }

    async fn task(store: &MemoryStore, summary: &str) -> Task {
        store
            .create_task(NewTask {
                user_id: 2,
                summary: summary.to_string(),
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_truncate_summary() {
        assert_eq!(truncate_summary("0123456789", 30), "0123456789");
        assert_eq!(truncate_summary("abc", 3), "abc");
        assert_eq!(truncate_summary("abcd", 3), "abc...");
        assert_eq!(truncate_summary("", 0), "");
        assert_eq!(truncate_summary("a", 0), "...");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_summary("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_summary("日本語テキスト", 3), "日本語...");
    }

    #[tokio::test]
    async fn test_long_summary_is_truncated_for_each_manager() {
        let (store, sink, service) = setup().await;
        let summary = "x".repeat(50);
        let task = task(&store, &summary).await;

        let sent = service.notify_managers_on_task_saved(&task).await.unwrap();
        assert_eq!(sent, 2);

        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 2);
        for notification in &notifications {
            assert!(notification.recipient.is_manager());
            assert_eq!(notification.owner.id, 2);
            assert_eq!(notification.owner.username, "tech1");
            assert_eq!(notification.task.id, task.id);
            assert_eq!(notification.summary, format!("{}...", "x".repeat(30)));
        }
    }

    #[tokio::test]
    async fn test_short_summary_is_untouched() {
        let (store, sink, service) = setup().await;
        let task = task(&store, "0123456789").await;

        service.notify_managers_on_task_saved(&task).await.unwrap();
        assert!(sink
            .notifications()
            .iter()
            .all(|n| n.summary == "0123456789"));
    }

    #[tokio::test]
    async fn test_no_managers_emits_nothing() {
        let store = MemoryStore::new();
        let owner = add_user(&store, "tech1", UserRole::Technician).await;
        let sink = MemorySink::new();
        let users = UserService::new(Arc::new(store.clone()), Arc::new(CredentialHasher::new("key")));
        let service = NotificationService::new(users, Arc::new(sink.clone()), 30);

        let task = store
            .create_task(NewTask {
                user_id: owner.id,
                summary: "summary".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(service.notify_managers_on_task_saved(&task).await.unwrap(), 0);
        assert!(sink.is_empty());
    }

    #[derive(Debug)]
    struct BrokenUsers;

    #[async_trait::async_trait]
    impl UserStore for BrokenUsers {
        async fn create_user(&self, _: NewUser) -> crate::store::StoreResult<User> {
            Err(crate::store::StoreError::Unavailable("down".to_string()))
        }

        async fn get_user_by_id(&self, _: i64) -> crate::store::StoreResult<User> {
            Err(crate::store::StoreError::Unavailable("down".to_string()))
        }

        async fn get_user_by_username_and_password(
            &self,
            _: &str,
            _: &str,
        ) -> crate::store::StoreResult<User> {
            Err(crate::store::StoreError::Unavailable("down".to_string()))
        }

        async fn list_users(
            &self,
            _: Pagination,
            _: &UserFilter,
        ) -> crate::store::StoreResult<crate::store::Page<User>> {
            Err(crate::store::StoreError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_fan_out() {
        let (store, sink, _) = setup().await;
        let task = task(&store, "summary").await;

        let users = UserService::new(Arc::new(BrokenUsers), Arc::new(CredentialHasher::new("key")));
        let service = NotificationService::new(users, Arc::new(sink.clone()), 30);

        let err = service.notify_managers_on_task_saved(&task).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal));
        assert!(sink.is_empty());

        service.spawn(task).await.unwrap();
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_missing_owner_aborts_fan_out() {
        let (store, sink, service) = setup().await;
        let mut task = task(&store, "summary").await;
        task.user_id = 99;

        let err = service.notify_managers_on_task_saved(&task).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_spawn_runs_in_background() {
        let (store, sink, service) = setup().await;
        let task = task(&store, "summary").await;

        service.spawn(task).await.unwrap();
        assert_eq!(sink.len(), 2);
    }
}

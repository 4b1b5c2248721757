/// Task service
///
/// Creates tasks on behalf of their owner and lists them through the role
/// based visibility rules in [`crate::auth::authorization`].

use std::sync::Arc;
use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{task_visibility, Requester};
use crate::models::task::{NewTask, Task};
use crate::store::{Page, Pagination, TaskStore};

#[derive(Debug, Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// Creates an `opened` task owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ForeignKeyConstraint`] unchanged when the
    /// owner does not exist; any other store failure is logged and becomes
    /// [`ServiceError::Internal`]
    pub async fn create_task(&self, user_id: i64, summary: String) -> ServiceResult<Task> {
        let task = self
            .tasks
            .create_task(NewTask { user_id, summary })
            .await
            .map_err(|e| ServiceError::from_store("service.task.create_task", e))?;

        info!(task_id = task.id, user_id, "Task created");
        Ok(task)
    }

    /// Lists the tasks `requester` may see
    ///
    /// Managers see every task; everyone else only their own.
    pub async fn list_tasks(
        &self,
        page: Pagination,
        requester: &Requester,
    ) -> ServiceResult<Page<Task>> {
        let filter = task_visibility(requester);

        self.tasks
            .list_tasks(page, &filter)
            .await
            .map_err(|e| ServiceError::from_store("service.task.list_tasks", e))
    }
}

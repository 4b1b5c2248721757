/// Task endpoints
///
/// # Endpoints
///
/// - `POST /api/tasks` - Create a task owned by the caller
/// - `GET /api/tasks?limit&offset` - List the tasks the caller may see
///
/// Both routes sit behind the bearer gate. The caller is derived from the
/// session claims: `sub` gives the user ID and `role` the visibility.

use crate::{
    app::AppState,
    error::ApiResult,
    routes::TIMESTAMP_FORMAT,
    validation::validate_with,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use fieldtask_shared::{
    auth::{authorization::Requester, middleware::RequestClaims},
    models::task::{Task, TaskStatus},
    store::Pagination,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Page size when `limit` is absent or unusable
pub const DEFAULT_LIMIT: i64 = 10;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 2500, message = "summary must be 1-2500 characters"))]
    pub summary: String,
}

/// Raw listing parameters
///
/// Kept as strings so that non-numeric values fall back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListTasksQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(
            parse_non_negative(self.limit.as_deref()).unwrap_or(DEFAULT_LIMIT),
            parse_non_negative(self.offset.as_deref()).unwrap_or(0),
        )
    }
}

fn parse_non_negative(value: Option<&str>) -> Option<i64> {
    value?.trim().parse::<i64>().ok().filter(|n| *n >= 0)
}

/// Reference to the owning user
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskOwnerDto {
    pub id: i64,
}

/// Task as returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskDto {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub user: TaskOwnerDto,
    pub summary: String,
    pub status: TaskStatus,
}

impl From<Task> for TaskDto {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            created_at: task.created_at.format(TIMESTAMP_FORMAT).to_string(),
            updated_at: task.updated_at.format(TIMESTAMP_FORMAT).to_string(),
            user: TaskOwnerDto { id: task.user_id },
            summary: task.summary,
            status: task.status,
        }
    }
}

/// Single task response
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub data: TaskDto,
}

/// Task listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    /// Number of tasks in `data`
    pub count: usize,

    /// Number of visible tasks across all pages
    pub total: i64,

    pub data: Vec<TaskDto>,
}

/// Create a task
///
/// The task is owned by the caller. Managers are notified in the
/// background; the response does not wait for it.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the caller's user no longer
///   exists
/// - `403 Forbidden`: Session subject is not a user ID
pub async fn create_task(
    State(state): State<AppState>,
    Extension(claims): Extension<RequestClaims>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    validate_with(&req, |_| {})?;
    let requester = Requester::from_claims(&claims)?;

    let task = state.tasks.create_task(requester.id, req.summary).await?;

    // Fire and forget
    state.notifications.spawn(task.clone());

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            data: TaskDto::from(task),
        }),
    ))
}

/// List tasks
///
/// Managers see every task; technicians only their own. Newest first.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(claims): Extension<RequestClaims>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let requester = Requester::from_claims(&claims)?;

    let page = state
        .tasks
        .list_tasks(query.pagination(), &requester)
        .await?;

    let data: Vec<TaskDto> = page.items.into_iter().map(TaskDto::from).collect();

    Ok(Json(TaskListResponse {
        count: data.len(),
        total: page.total,
        data,
    }))
}

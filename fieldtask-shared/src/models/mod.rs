/// Database models for FieldTask
///
/// This module contains the domain records and the SQL each of them runs
/// against PostgreSQL. Services never call these queries directly; they go
/// through the traits in [`crate::store`].
///
/// # Models
///
/// - `user`: Managers and technicians
/// - `task`: Field tasks owned by a user
///
/// # Example
///
/// ```no_run
/// use fieldtask_shared::models::user::{NewUser, User, UserRole};
/// use fieldtask_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, NewUser {
///     username: "jdoe".to_string(),
///     email: "jdoe@example.com".to_string(),
///     password: "<keyed hash>".to_string(),
///     role: UserRole::Manager,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;

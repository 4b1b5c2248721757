/// User model and database operations
///
/// This module provides the User model and the queries the PostgreSQL store
/// runs against the `users` table. Users are either managers or technicians;
/// the role is never empty at rest.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('manager', 'technician');
///
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ,
///     username VARCHAR(20) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL,
///     password VARCHAR(64) NOT NULL,
///     role user_role NOT NULL DEFAULT 'technician'
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use fieldtask_shared::models::user::{NewUser, User, UserRole};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, NewUser {
///     username: "jdoe".to_string(),
///     email: "jdoe@example.com".to_string(),
///     password: "c70a5040e8f1...".to_string(),
///     role: UserRole::Technician,
/// }).await?;
///
/// let found = User::find_by_id(&pool, user.id).await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::fmt;
use std::str::FromStr;

use crate::store::Pagination;

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Sees every task and may manage users
    Manager,

    /// Sees only their own tasks
    #[default]
    Technician,
}

impl UserRole {
    /// All roles accepted at rest
    pub const ALL: [UserRole; 2] = [UserRole::Manager, UserRole::Technician];

    /// Gets role as string
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Manager => "manager",
            UserRole::Technician => "technician",
        }
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, UserRole::Manager)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known role
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(UserRole::Manager),
            "technician" => Ok(UserRole::Technician),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// User model
///
/// `password` holds the keyed hash of the password, never the plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID, assigned by the store
    pub id: i64,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,

    /// Unique login name (4-20 characters)
    pub username: String,

    /// Contact email
    pub email: String,

    /// Keyed password hash
    #[serde(skip_serializing)]
    pub password: String,

    /// Access role
    pub role: UserRole,
}

impl User {
    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }
}

/// Input for creating a user
///
/// The password must already be hashed and the role already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Optional conditions applied when listing users
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Only users with this role
    pub role: Option<UserRole>,
}

impl UserFilter {
    /// Filter selecting every manager
    pub fn managers() -> Self {
        Self {
            role: Some(UserRole::Manager),
        }
    }

    /// Checks whether a user passes the filter
    pub fn matches(&self, user: &User) -> bool {
        self.role.map_or(true, |role| user.role == role)
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        query.push(" WHERE deleted_at IS NULL");
        if let Some(role) = self.role {
            query.push(" AND role = ").push_bind(role);
        }
    }
}

const USER_COLUMNS: &str =
    "id, created_at, updated_at, deleted_at, username, email, password, role";

impl User {
    /// Inserts a new user and returns the stored row
    ///
    /// # Errors
    ///
    /// Returns an error if the username already exists or the database
    /// connection fails
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a live user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a live user by username and password hash
    ///
    /// The comparison is a plain equality on the stored hash.
    pub async fn find_by_credentials(
        pool: &PgPool,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE username = $1 AND password = $2 AND deleted_at IS NULL
            "#
        ))
        .bind(username)
        .bind(password_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists users matching `filter`, ordered by ID
    ///
    /// A zero limit or offset leaves that clause out.
    pub async fn list(
        pool: &PgPool,
        page: Pagination,
        filter: &UserFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        filter.push_conditions(&mut query);
        query.push(" ORDER BY id");
        page.push_clauses(&mut query);

        query.build_query_as::<User>().fetch_all(pool).await
    }

    /// Counts users matching `filter`
    pub async fn count(pool: &PgPool, filter: &UserFilter) -> Result<i64, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(id) FROM users");
        filter.push_conditions(&mut query);

        let (total,) = query.build_query_as::<(i64,)>().fetch_one(pool).await?;
        Ok(total)
    }
}

/// User service
///
/// Creates users with hashed passwords and exposes the lookups the login
/// flow and the notification fan-out rely on.

use std::sync::Arc;
use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::auth::credentials::CredentialHasher;
use crate::models::user::{NewUser, User, UserFilter, UserRole};
use crate::store::{Page, Pagination, UserStore};

/// Input for [`UserService::create_user`]
///
/// `password` is plaintext here; it is hashed before reaching the store.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,

    /// Defaults to technician when absent
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    hasher: Arc<CredentialHasher>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    pub async fn create_user(&self, data: CreateUser) -> ServiceResult<User> {
        let new_user = NewUser {
            username: data.username,
            email: data.email,
            password: self.hasher.hash(&data.password),
            role: data.role.unwrap_or_default(),
        };

        let user = self
            .users
            .create_user(new_user)
            .await
            .map_err(|e| ServiceError::from_store("service.user.create_user", e))?;

        info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: i64) -> ServiceResult<User> {
        self.users
            .get_user_by_id(id)
            .await
            .map_err(|e| ServiceError::from_store("service.user.get_user_by_id", e))
    }

    /// Looks a user up by username and plaintext password
    pub async fn get_user_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> ServiceResult<User> {
        let password_hash = self.hasher.hash(password);

        self.users
            .get_user_by_username_and_password(username, &password_hash)
            .await
            .map_err(|e| {
                ServiceError::from_store("service.user.get_user_by_username_and_password", e)
            })
    }

    pub async fn list_users(
        &self,
        page: Pagination,
        filter: &UserFilter,
    ) -> ServiceResult<Page<User>> {
        self.users
            .list_users(page, filter)
            .await
            .map_err(|e| ServiceError::from_store("service.user.list_users", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn service() -> UserService {
        UserService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(CredentialHasher::new("key")),
        )
    }

    fn create(username: &str, role: Option<UserRole>) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "S3cR31".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let user = service().create_user(create("jdoe", None)).await.unwrap();
        assert_eq!(
            user.password,
            "c70a5040e8f1bad417435911e93d030ac8894dd7af3fc613d0af7a59dd50ccc0"
        );
    }

    #[tokio::test]
    async fn test_role_defaults_to_technician() {
        let service = service();
        let tech = service.create_user(create("tech", None)).await.unwrap();
        let boss = service
            .create_user(create("boss", Some(UserRole::Manager)))
            .await
            .unwrap();

        assert_eq!(tech.role, UserRole::Technician);
        assert_eq!(boss.role, UserRole::Manager);
    }

    #[tokio::test]
    async fn test_lookup_by_credentials() {
        let service = service();
        let created = service.create_user(create("jdoe", None)).await.unwrap();

        let found = service
            .get_user_by_username_and_password("jdoe", "S3cR31")
            .await
            .unwrap();
        assert_eq!(found.id, created.id);

        let err = service
            .get_user_by_username_and_password("jdoe", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_user_by_id_miss() {
        let err = service().get_user_by_id(99).await.unwrap_err();
        assert_eq!(err.to_string(), "user not found");
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let service = service();
        service.create_user(create("jdoe", None)).await.unwrap();
        let err = service.create_user(create("jdoe", None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }
}

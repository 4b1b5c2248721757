/// Request validation helpers
///
/// Field rules are declared with `validator` derives on the request types.
/// Rules that need data, like the set of accepted roles, are plain values
/// built once at startup and kept in [`crate::app::AppState`].

use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::ApiError;
use fieldtask_shared::models::user::UserRole;

/// Accepted values for a role field
#[derive(Debug, Clone)]
pub struct RoleRule {
    allowed: Vec<UserRole>,
}

impl Default for RoleRule {
    fn default() -> Self {
        Self::new(UserRole::ALL.to_vec())
    }
}

impl RoleRule {
    pub fn new(allowed: Vec<UserRole>) -> Self {
        Self { allowed }
    }

    /// Parses an optional role
    ///
    /// An absent role passes as `None`; an unknown or disallowed one fails.
    pub fn check(&self, role: Option<&str>) -> Result<Option<UserRole>, ValidationError> {
        let Some(raw) = role else {
            return Ok(None);
        };

        match raw.parse::<UserRole>() {
            Ok(role) if self.allowed.contains(&role) => Ok(Some(role)),
            _ => {
                let mut error = ValidationError::new("role");
                error.message = Some(Cow::from(format!(
                    "role must be one of: {}",
                    self.allowed
                        .iter()
                        .map(UserRole::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
                error.add_param(Cow::from("value"), &raw);
                Err(error)
            }
        }
    }
}

/// Runs the derived rules of `request`, then `extra`, reporting all failures
/// together
pub fn validate_with<T, F>(request: &T, extra: F) -> Result<(), ApiError>
where
    T: Validate,
    F: FnOnce(&mut ValidationErrors),
{
    let mut errors = request.validate().err().unwrap_or_default();
    extra(&mut errors);

    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(ApiError::from_validation(errors))
    }
}

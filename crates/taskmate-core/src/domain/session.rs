//! The authenticated user, injected into services instead of looked up.

use super::errors::TaskMateError;
use super::ids::UserId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<UserId>,
}

impl Session {
    pub fn signed_in(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user_id(&self) -> Result<&UserId, TaskMateError> {
        self.user_id.as_ref().ok_or(TaskMateError::Unauthenticated)
    }
}

//! Per-session access state

use std::sync::Arc;

use crate::sql::ident::DEFAULT_SCHEMA;
use crate::user::User;

/// Identity and defaults a statement runs under
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Authenticated user; `None` when authentication is disabled
    user: Option<Arc<User>>,
    /// Schema for unqualified names
    default_schema: String,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl SessionContext {
    pub fn new(user: Arc<User>, default_schema: impl Into<String>) -> Self {
        SessionContext {
            user: Some(user),
            default_schema: default_schema.into(),
        }
    }

    /// Session without an identity; every check passes
    pub fn anonymous() -> Self {
        SessionContext {
            user: None,
            default_schema: DEFAULT_SCHEMA.to_string(),
        }
    }

    pub fn user(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user.as_deref().map(User::name)
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    /// Change the default schema (`SET search_path`)
    pub fn set_default_schema(&mut self, schema: impl Into<String>) {
        self.default_schema = schema.into();
    }

    /// User the access checks apply to; `None` if checks are skipped
    pub(crate) fn checked_user(&self) -> Option<&User> {
        self.user.as_deref().filter(|user| !user.is_superuser())
    }
}

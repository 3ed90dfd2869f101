//! Client authentication
//!
//! Connections authenticate with a client certificate whose CN names the
//! user. With authentication disabled, sessions carry no user and every
//! access check passes.

pub mod cert;
pub mod connection;

use std::sync::Arc;

use crate::config::AccessConfig;
use crate::error::AccessResult;
use crate::session::SessionContext;
use crate::user::{User, UserDirectory};

pub use cert::ClientCertAuth;
pub use connection::{ClientCertificate, ConnectionProperties, Protocol};

/// Resolves user names to users
pub trait UserLookup: Send + Sync {
    fn find_user(&self, name: &str) -> Option<Arc<User>>;
}

impl UserLookup for UserDirectory {
    fn find_user(&self, name: &str) -> Option<Arc<User>> {
        self.get(name)
    }
}

/// An authentication method
pub trait AuthenticationMethod: Send + Sync {
    /// Method name as used in configuration
    fn name(&self) -> &'static str;

    /// Resolve the user a connection authenticates as
    fn authenticate(&self, user_name: &str, connection: &ConnectionProperties) -> AccessResult<Arc<User>>;
}

/// Entry point for new sessions
pub struct Authentication {
    enabled: bool,
    default_schema: String,
    method: Box<dyn AuthenticationMethod>,
}

impl Authentication {
    pub fn new(config: &AccessConfig, users: Arc<dyn UserLookup>) -> Self {
        Authentication {
            enabled: config.auth_enabled,
            default_schema: config.default_schema.clone(),
            method: Box::new(ClientCertAuth::new(users)),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Method used for connections, `None` when authentication is disabled
    pub fn method(&self) -> Option<&dyn AuthenticationMethod> {
        self.enabled.then_some(self.method.as_ref())
    }

    /// Authenticate a connection and create its session
    pub fn open_session(&self, user_name: &str, connection: &ConnectionProperties) -> AccessResult<SessionContext> {
        let Some(method) = self.method() else {
            let mut session = SessionContext::anonymous();
            session.set_default_schema(self.default_schema.clone());
            return Ok(session);
        };
        let user = method.authenticate(user_name, connection)?;
        tracing::info!(user = %user.name(), method = method.name(), "Session opened");
        Ok(SessionContext::new(user, self.default_schema.clone()))
    }
}

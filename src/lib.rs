//! RooDB access control
//!
//! Features:
//! - Client certificate authentication (certificate CN names the user)
//! - Replicated user and privilege directory with snapshot reads
//! - Privilege validation of analyzed statements
//! - Remapping of not-found errors so users cannot discover objects

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod sql;
pub mod tls;
pub mod user;

pub use config::{AccessConfig, ConfigError};
pub use error::{AccessError, AccessResult};
pub use session::SessionContext;
pub use user::{DirectoryManager, User};

//! Access control configuration
//!
//! Read from environment variables:
//! - `ROODB_AUTH_ENABLED`: `true` (default) or `false`
//! - `ROODB_DEFAULT_SCHEMA`: schema for unqualified names (default `doc`)
//! - `ROODB_CLIENT_CA_FILE`: PEM file with the CA(s) client certificates are
//!   verified against, see [`crate::tls::ClientCertTlsConfig::from_config`]

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::sql::ident::DEFAULT_SCHEMA;

pub const ENV_AUTH_ENABLED: &str = "ROODB_AUTH_ENABLED";
pub const ENV_DEFAULT_SCHEMA: &str = "ROODB_DEFAULT_SCHEMA";
pub const ENV_CLIENT_CA_FILE: &str = "ROODB_CLIENT_CA_FILE";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Access control configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    /// When false, sessions run without a user and every check passes
    pub auth_enabled: bool,
    pub default_schema: String,
    pub client_ca_file: Option<PathBuf>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        AccessConfig {
            auth_enabled: true,
            default_schema: DEFAULT_SCHEMA.to_string(),
            client_ca_file: None,
        }
    }
}

impl AccessConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` (variable name -> value)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = AccessConfig::default();

        if let Some(value) = lookup(ENV_AUTH_ENABLED) {
            config.auth_enabled = parse_bool(ENV_AUTH_ENABLED, &value)?;
        }

        if let Some(value) = lookup(ENV_DEFAULT_SCHEMA) {
            let schema = value.trim();
            if schema.is_empty() || schema.contains('.') {
                return Err(ConfigError::Invalid {
                    name: ENV_DEFAULT_SCHEMA,
                    value,
                });
            }
            config.default_schema = schema.to_string();
        }

        config.client_ca_file = lookup(ENV_CLIENT_CA_FILE)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}

//! Metadata store
//!
//! User and privilege mutations are expressed as `WriteRequest`s submitted
//! to a `MetadataStore`. A submit resolves once the write is committed; the
//! resulting metadata is delivered separately through the store's change
//! channel, so local snapshots converge eventually.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{AccessError, AccessResult};
use crate::sql::privileges::Privilege;

use super::metadata::{MetadataChanged, UsersMetadata, UsersPrivilegesMetadata};
use super::SUPERUSER_NAME;

/// Write requests, replicated as opaque log entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteRequest {
    CreateUser {
        name: String,
    },
    /// Drop a user together with its privileges
    DropUser {
        name: String,
        if_exists: bool,
    },
    /// GRANT / DENY / REVOKE for each (user, privilege) pair
    ApplyPrivileges {
        user_names: Vec<String>,
        privileges: Vec<Privilege>,
    },
}

impl WriteRequest {
    pub fn encode(&self) -> AccessResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(data: &[u8]) -> AccessResult<Self> {
        Ok(bincode::deserialize(data)?)
    }
}

/// Replicated metadata store
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Commit a write; returns the number of affected rows
    async fn submit(&self, request: WriteRequest) -> AccessResult<u64>;

    /// Change notifications, starting with the current metadata
    fn subscribe(&self) -> watch::Receiver<MetadataChanged>;
}

#[derive(Debug, Default)]
struct StoreState {
    version: u64,
    users: UsersMetadata,
    privileges: UsersPrivilegesMetadata,
}

impl StoreState {
    fn changed(&self) -> MetadataChanged {
        MetadataChanged {
            version: self.version,
            users: Some(self.users.clone()),
            privileges: Some(self.privileges.clone()),
        }
    }
}

/// In-memory store for single-node use and tests
pub struct MemMetadataStore {
    state: RwLock<StoreState>,
    tx: watch::Sender<MetadataChanged>,
}

impl Default for MemMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemMetadataStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(MetadataChanged::default());
        MemMetadataStore {
            state: RwLock::new(StoreState::default()),
            tx,
        }
    }

    /// Store preloaded with existing metadata sections
    pub fn with_metadata(users: UsersMetadata, privileges: UsersPrivilegesMetadata) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.write();
            state.users = users;
            state.privileges = privileges;
            state.version = 1;
            store.tx.send_replace(state.changed());
        }
        store
    }

    pub fn users(&self) -> UsersMetadata {
        self.state.read().users.clone()
    }

    pub fn privileges(&self) -> UsersPrivilegesMetadata {
        self.state.read().privileges.clone()
    }

    fn apply(state: &mut StoreState, request: &WriteRequest) -> AccessResult<u64> {
        match request {
            WriteRequest::CreateUser { name } => {
                if name == SUPERUSER_NAME || !state.users.add(name) {
                    return Err(AccessError::UserAlreadyExists(name.clone()));
                }
                tracing::debug!(user = %name, "Created user (metadata apply)");
                Ok(1)
            }
            WriteRequest::DropUser { name, if_exists } => {
                if !state.users.remove(name) {
                    return if *if_exists {
                        Ok(0)
                    } else {
                        Err(AccessError::user_unknown(name))
                    };
                }
                state.privileges.drop_user(name);
                tracing::debug!(user = %name, "Dropped user (metadata apply)");
                Ok(1)
            }
            WriteRequest::ApplyPrivileges {
                user_names,
                privileges,
            } => {
                if let Some(unknown) = user_names.iter().find(|n| !state.users.contains(n)) {
                    return Err(AccessError::user_unknown(unknown));
                }
                let mut affected = 0u64;
                for name in user_names {
                    for privilege in privileges {
                        if state.privileges.apply(name, privilege) {
                            affected += 1;
                        }
                    }
                }
                tracing::debug!(
                    users = user_names.len(),
                    privileges = privileges.len(),
                    affected,
                    "Applied privileges (metadata apply)"
                );
                Ok(affected)
            }
        }
    }
}

#[async_trait]
impl MetadataStore for MemMetadataStore {
    async fn submit(&self, request: WriteRequest) -> AccessResult<u64> {
        let mut state = self.state.write();
        let affected = Self::apply(&mut state, &request)?;
        if affected > 0 {
            state.version += 1;
            self.tx.send_replace(state.changed());
        }
        Ok(affected)
    }

    fn subscribe(&self) -> watch::Receiver<MetadataChanged> {
        self.tx.subscribe()
    }
}

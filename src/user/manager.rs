//! User directory manager
//!
//! Owns the current directory snapshot and the metadata store. Mutations
//! complete when the store commits them; the local snapshot catches up when
//! the store's change notification is applied by the listener task.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::access;
use crate::auth::UserLookup;
use crate::error::{AccessError, AccessResult};
use crate::session::SessionContext;
use crate::sql::analyzed::AnalyzedStatement;
use crate::sql::error::SqlError;
use crate::sql::privileges::Privilege;

use super::directory::{DirectoryCell, UserDirectory};
use super::metadata::MetadataChanged;
use super::store::{MetadataStore, WriteRequest};
use super::User;

/// Facade for user management and access enforcement
pub struct DirectoryManager {
    store: Arc<dyn MetadataStore>,
    directory: DirectoryCell,
}

impl DirectoryManager {
    /// Create a manager seeded with the store's current metadata
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        let current = store.subscribe().borrow().clone();
        let directory = UserDirectory::rebuild(current.users.as_ref(), current.privileges.as_ref());
        DirectoryManager {
            store,
            directory: DirectoryCell::new(directory),
        }
    }

    /// Create a manager and start applying the store's change notifications
    pub fn start(store: Arc<dyn MetadataStore>) -> (Arc<Self>, JoinHandle<()>) {
        let rx = store.subscribe();
        let manager = Arc::new(Self::new(store));
        let handle = manager.spawn_listener(rx);
        (manager, handle)
    }

    // ============ Mutations ============

    /// CREATE USER; returns the number of affected rows
    pub async fn create_user(&self, name: &str) -> AccessResult<u64> {
        info!(user = %name, "Creating user");
        self.store
            .submit(WriteRequest::CreateUser {
                name: name.to_string(),
            })
            .await
    }

    /// DROP USER; 0 rows if the user is absent and `if_exists` is set
    pub async fn drop_user(&self, name: &str, if_exists: bool) -> AccessResult<u64> {
        if self.find_user(name).is_some_and(|user| user.is_superuser()) {
            return Err(AccessError::UnsupportedOperation(format!(
                "Cannot drop superuser '{}'",
                name
            )));
        }
        info!(user = %name, if_exists, "Dropping user");
        self.store
            .submit(WriteRequest::DropUser {
                name: name.to_string(),
                if_exists,
            })
            .await
    }

    /// GRANT / DENY / REVOKE `privileges` for every user in `user_names`
    ///
    /// All names must refer to existing regular users; nothing is written
    /// otherwise. Returns the number of (user, privilege) pairs that changed.
    pub async fn apply_privileges(&self, user_names: &[String], privileges: &[Privilege]) -> AccessResult<u64> {
        let directory = self.users();
        for name in user_names {
            match directory.get(name) {
                None => return Err(AccessError::user_unknown(name)),
                Some(user) if user.is_superuser() => {
                    return Err(AccessError::UnsupportedOperation(format!(
                        "Cannot alter privileges for superuser '{}'",
                        name
                    )))
                }
                Some(_) => {}
            }
        }

        info!(users = ?user_names, privileges = privileges.len(), "Applying privileges");
        self.store
            .submit(WriteRequest::ApplyPrivileges {
                user_names: user_names.to_vec(),
                privileges: privileges.to_vec(),
            })
            .await
    }

    // ============ Lookups ============

    pub fn find_user(&self, name: &str) -> Option<Arc<User>> {
        self.directory.load().get(name)
    }

    /// Current snapshot
    pub fn users(&self) -> Arc<UserDirectory> {
        self.directory.load()
    }

    // ============ Enforcement ============

    /// Check that the session may execute `statement`
    pub fn ensure_authorized(&self, statement: &AnalyzedStatement, session: &SessionContext) -> AccessResult<()> {
        access::validate(statement, session)
    }

    /// Hide not-found errors from users that cannot see the object's scope
    pub fn validate_exception(&self, error: SqlError, session: &SessionContext) -> SqlError {
        access::remap(error, session)
    }

    // ============ Metadata changes ============

    /// Rebuild and publish the snapshot for a metadata change
    pub fn apply_metadata_change(&self, change: &MetadataChanged) {
        let previous = self.directory.load();
        let directory = UserDirectory::rebuild(change.users.as_ref(), change.privileges.as_ref())
            .reuse_unchanged(&previous);
        if directory == *previous {
            debug!(version = change.version, "User metadata unchanged");
            return;
        }
        info!(version = change.version, users = directory.len(), "Rebuilt user directory");
        self.directory.publish(directory);
    }

    /// Apply every notification from `rx` until its sender or the manager
    /// is dropped
    pub fn spawn_listener(self: &Arc<Self>, mut rx: watch::Receiver<MetadataChanged>) -> JoinHandle<()> {
        let manager = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                let change = rx.borrow_and_update().clone();
                match manager.upgrade() {
                    Some(manager) => manager.apply_metadata_change(&change),
                    None => break,
                }
                if rx.changed().await.is_err() {
                    debug!("Metadata store closed, stopping user directory listener");
                    break;
                }
            }
        })
    }
}

impl UserLookup for DirectoryManager {
    fn find_user(&self, name: &str) -> Option<Arc<User>> {
        DirectoryManager::find_user(self, name)
    }
}

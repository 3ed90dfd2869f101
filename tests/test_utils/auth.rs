//! Auth test utilities
//!
//! Helpers to set up a user directory backed by the in-memory metadata store
//! and to wait for the directory to converge after a mutation.

use std::sync::Arc;
use std::time::Duration;

use roodb_access::sql::{Privilege, PrivilegeClass, PrivilegeState, PrivilegeType};
use roodb_access::user::{MemMetadataStore, UserDirectory};
use roodb_access::{DirectoryManager, SessionContext, User};
use tokio::task::JoinHandle;

/// A running directory manager and its store
pub struct TestDirectory {
    pub store: Arc<MemMetadataStore>,
    pub manager: Arc<DirectoryManager>,
    pub listener: JoinHandle<()>,
}

impl TestDirectory {
    /// Start a manager with the given users, each holding `privileges`
    pub async fn start(users: &[(&str, Vec<Privilege>)]) -> Self {
        let store = Arc::new(MemMetadataStore::new());
        let (manager, listener) = DirectoryManager::start(store.clone());

        for (name, _) in users {
            manager.create_user(name).await.expect("Failed to create user");
        }
        wait_for_directory(&manager, |d| users.iter().all(|(name, _)| d.contains(name))).await;

        for (name, privileges) in users {
            if !privileges.is_empty() {
                manager
                    .apply_privileges(&[name.to_string()], privileges)
                    .await
                    .expect("Failed to apply privileges");
            }
        }
        wait_for_directory(&manager, |d| {
            users
                .iter()
                .all(|(name, privileges)| d.get(name).is_some_and(|u| u.privileges().len() == privileges.len()))
        })
        .await;

        TestDirectory {
            store,
            manager,
            listener,
        }
    }

    /// Session of an existing user in the `doc` schema
    pub fn session(&self, name: &str) -> SessionContext {
        let user = self.manager.find_user(name).expect("User not found");
        SessionContext::new(user, "doc")
    }

    pub fn user(&self, name: &str) -> Arc<User> {
        self.manager.find_user(name).expect("User not found")
    }
}

/// Poll the manager until the snapshot satisfies `predicate`
pub async fn wait_for_directory<F>(manager: &DirectoryManager, predicate: F)
where
    F: Fn(&UserDirectory) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !predicate(&manager.users()) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Timed out waiting for user directory");
}

pub fn cluster_grant(ty: PrivilegeType) -> Privilege {
    Privilege::cluster_grant(ty, "crate")
}

pub fn schema_privilege(state: PrivilegeState, ty: PrivilegeType, schema: &str) -> Privilege {
    Privilege::new(state, ty, PrivilegeClass::Schema, Some(schema), "crate")
}

pub fn table_privilege(state: PrivilegeState, ty: PrivilegeType, table: &str) -> Privilege {
    Privilege::new(state, ty, PrivilegeClass::Table, Some(table), "crate")
}

//! User directory snapshots
//!
//! A `UserDirectory` is an immutable view of all users. It is rebuilt
//! wholesale from the metadata sections on every change notification and
//! published through a `DirectoryCell`; readers clone the current `Arc` and
//! never observe a half-built snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::metadata::{UsersMetadata, UsersPrivilegesMetadata};
use super::{crate_user, User};

/// Immutable snapshot: user name -> user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDirectory {
    users: BTreeMap<String, Arc<User>>,
}

impl Default for UserDirectory {
    /// Snapshot holding only the built-in superuser
    fn default() -> Self {
        Self::rebuild(None, None)
    }
}

impl UserDirectory {
    /// Build a snapshot from the metadata sections
    ///
    /// Always contains the built-in superuser. Each persisted name becomes a
    /// regular user carrying its privileges (empty if none are recorded).
    pub fn rebuild(users: Option<&UsersMetadata>, privileges: Option<&UsersPrivilegesMetadata>) -> Self {
        let superuser = crate_user();
        let mut map = BTreeMap::new();
        map.insert(superuser.name().to_string(), Arc::new(superuser));

        for name in users.into_iter().flat_map(UsersMetadata::names) {
            if map.contains_key(name) {
                continue;
            }
            let user_privileges = privileges
                .and_then(|p| p.user_privileges(name))
                .cloned()
                .unwrap_or_default();
            map.insert(name.to_string(), Arc::new(User::regular(name, user_privileges)));
        }

        UserDirectory { users: map }
    }

    /// Share `Arc<User>` instances with `previous` where the user is unchanged
    #[must_use]
    pub fn reuse_unchanged(mut self, previous: &UserDirectory) -> Self {
        for (name, user) in self.users.iter_mut() {
            if let Some(old) = previous.users.get(name) {
                if old == user {
                    *user = Arc::clone(old);
                }
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<User>> {
        self.users.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.users.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<User>> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Holder of the current snapshot
///
/// The write lock is held only to swap the pointer.
#[derive(Debug, Default)]
pub struct DirectoryCell {
    current: RwLock<Arc<UserDirectory>>,
}

impl DirectoryCell {
    pub fn new(directory: UserDirectory) -> Self {
        DirectoryCell {
            current: RwLock::new(Arc::new(directory)),
        }
    }

    /// Current snapshot
    pub fn load(&self) -> Arc<UserDirectory> {
        Arc::clone(&self.current.read())
    }

    /// Replace the current snapshot
    pub fn publish(&self, directory: UserDirectory) {
        let directory = Arc::new(directory);
        *self.current.write() = directory;
    }
}

//! Connection registry: subject identity → live connection, plus the admin set.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::auth::tokens::Identity;
use crate::models::user::Role;

use super::connection::{Connection, ConnectionId};

/// Close code sent to a connection superseded by a newer one for the same user.
pub const CLOSE_SESSION_REPLACED: u16 = 4008;

/// Close code sent to every connection during shutdown.
pub const CLOSE_GOING_AWAY: u16 = 1001;

#[derive(Default)]
struct RegistryInner {
    by_user: HashMap<String, Arc<dyn Connection>>,
    admins: HashMap<ConnectionId, Arc<dyn Connection>>,
}

/// Shared registry of all authenticated gateway connections.
///
/// Both collections sit behind one `parking_lot::Mutex` so `register`,
/// `unregister` and snapshot reads never observe a half-applied update.
/// Snapshots are cloned out under the lock; callers send without holding it.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: Mutex<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `identity` to `conn`, adding it to the admin set for admins.
    ///
    /// Returns the connection previously mapped to the same subject, if it was a
    /// different one. That connection is dropped from the admin set here; closing
    /// it is up to the caller.
    pub fn register(
        &self,
        identity: &Identity,
        conn: Arc<dyn Connection>,
    ) -> Option<Arc<dyn Connection>> {
        let mut inner = self.inner.lock();
        let conn_id = conn.id();

        if identity.role == Role::Admin {
            inner.admins.insert(conn_id, conn.clone());
        }

        let previous = inner
            .by_user
            .insert(identity.subject_id.clone(), conn)
            .filter(|prev| prev.id() != conn_id);

        if let Some(prev) = &previous {
            inner.admins.remove(&prev.id());
        }

        previous
    }

    /// Remove `conn` from the registry.
    ///
    /// The user mapping is only removed while it still points at `conn`; a stale
    /// teardown for a replaced connection leaves the newer mapping alone.
    pub fn unregister(&self, identity: &Identity, conn: &dyn Connection) {
        let mut inner = self.inner.lock();
        let conn_id = conn.id();

        let is_current = inner
            .by_user
            .get(&identity.subject_id)
            .is_some_and(|current| current.id() == conn_id);
        if is_current {
            inner.by_user.remove(&identity.subject_id);
        }

        inner.admins.remove(&conn_id);
    }

    pub fn lookup(&self, subject_id: &str) -> Option<Arc<dyn Connection>> {
        self.inner.lock().by_user.get(subject_id).cloned()
    }

    /// Snapshot of every registered connection.
    pub fn all_connected(&self) -> Vec<Arc<dyn Connection>> {
        self.inner.lock().by_user.values().cloned().collect()
    }

    /// Snapshot of every registered admin connection.
    pub fn all_admins(&self) -> Vec<Arc<dyn Connection>> {
        self.inner.lock().admins.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn admin_count(&self) -> usize {
        self.inner.lock().admins.len()
    }

    /// Ask every registered connection to close. Entries are removed by each
    /// connection's own teardown. Returns the number of connections signalled.
    pub fn close_all(&self, reason: &str) -> usize {
        let connections = self.all_connected();
        for conn in &connections {
            conn.close(CLOSE_GOING_AWAY, reason);
        }
        connections.len()
    }
}

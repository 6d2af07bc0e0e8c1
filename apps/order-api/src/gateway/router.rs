//! Event router: resolves a target selector against the registry and pushes a
//! serialized event to every open connection it finds.
//!
//! Delivery is best effort and at most once. A recipient that is offline or
//! already closed is skipped; the router never mutates the registry.

use std::sync::Arc;

use super::connection::Connection;
use super::events::Event;
use super::registry::ConnectionRegistry;

/// Which connections an event should reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The connection registered for one subject identity.
    User(String),
    /// Every administrator connection.
    AllAdmins,
    /// Every registered connection.
    AllConnected,
}

/// Dispatch entry point for domain services. Cloneable; lives in `AppState`.
#[derive(Clone)]
pub struct EventRouter {
    registry: Arc<ConnectionRegistry>,
}

impl EventRouter {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Send `event` to every open connection matching `target`.
    ///
    /// Returns the number of connections the frame was queued on.
    pub fn dispatch(&self, target: Target, event: &Event) -> usize {
        let recipients: Vec<Arc<dyn Connection>> = match &target {
            Target::User(subject_id) => self.registry.lookup(subject_id).into_iter().collect(),
            Target::AllAdmins => self.registry.all_admins(),
            Target::AllConnected => self.registry.all_connected(),
        };

        if recipients.is_empty() {
            tracing::debug!(?target, event = %event.event_type, "no connection for target");
            return 0;
        }

        let frame: Arc<str> = match event.to_json() {
            Ok(json) => json.into(),
            Err(err) => {
                tracing::error!(?err, event = %event.event_type, "failed to serialize event");
                return 0;
            }
        };

        let sent = recipients
            .iter()
            .filter(|conn| conn.is_open())
            .filter(|conn| conn.send(frame.clone()))
            .count();

        if sent == 0 {
            tracing::debug!(?target, event = %event.event_type, "target connections closed");
        } else {
            tracing::debug!(?target, event = %event.event_type, sent, "event dispatched");
        }

        sent
    }

    /// Send `event` to one user's connection.
    pub fn to_user(&self, subject_id: &str, event: &Event) -> usize {
        self.dispatch(Target::User(subject_id.to_string()), event)
    }

    pub fn to_admins(&self, event: &Event) -> usize {
        self.dispatch(Target::AllAdmins, event)
    }

    pub fn to_all(&self, event: &Event) -> usize {
        self.dispatch(Target::AllConnected, event)
    }
}

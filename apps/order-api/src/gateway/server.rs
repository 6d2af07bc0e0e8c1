//! WebSocket upgrade handler and per-connection event loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::auth::tokens::{Identity, InvalidCredential};
use crate::AppState;

use super::connection::{Connection, Outbound, SocketConnection};
use super::registry::{ConnectionRegistry, CLOSE_SESSION_REPLACED};

/// Close codes (4000-range for application-level).
pub const CLOSE_NOT_AUTHENTICATED: u16 = 4003;
pub const CLOSE_AUTH_FAILED: u16 = 4004;

#[derive(Debug, Deserialize)]
pub struct HandshakeQuery {
    token: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

/// The credential is checked before the upgrade completes, but rejections are
/// still delivered as close frames so browser clients can read the code.
async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Query(query): Query<HandshakeQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let verified = match query.token.as_deref() {
        Some(token) => state.tokens.verify(token),
        None => Err(InvalidCredential::Missing),
    };

    ws.on_upgrade(move |socket| async move {
        match verified {
            Ok(identity) => handle_connection(socket, state, identity).await,
            Err(err) => reject(socket, err).await,
        }
    })
}

async fn reject(socket: WebSocket, err: InvalidCredential) {
    let code = match err {
        InvalidCredential::Missing => CLOSE_NOT_AUTHENTICATED,
        _ => CLOSE_AUTH_FAILED,
    };
    tracing::debug!(reason = %err, code, "gateway handshake rejected");

    let (mut ws_tx, _ws_rx) = socket.split();
    let _ = send_close(&mut ws_tx, code, err.message()).await;
}

async fn handle_connection(socket: WebSocket, state: AppState, identity: Identity) {
    let (conn, mut outbound_rx) = SocketConnection::new();

    if let Some(previous) = state.registry.register(&identity, conn.clone()) {
        tracing::info!(
            user_id = %identity.subject_id,
            replaced = %previous.id(),
            "closing superseded gateway connection"
        );
        previous.close(CLOSE_SESSION_REPLACED, "Session replaced");
    }
    let guard = RegistrationGuard::new(state.registry.clone(), identity, conn);

    tracing::info!(
        conn_id = %guard.conn.id(),
        user_id = %guard.identity.subject_id,
        admin = guard.identity.is_admin(),
        connected = state.registry.len(),
        admins = state.registry.admin_count(),
        "gateway connection registered"
    );

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::trace!(conn_id = %guard.conn.id(), len = text.len(), "ignoring client message");
                    }
                    Some(Ok(Message::Binary(data))) => {
                        tracing::trace!(conn_id = %guard.conn.id(), len = data.len(), "ignoring binary message");
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, conn_id = %guard.conn.id(), "ws read error");
                        break;
                    }
                    Some(Ok(_)) => continue,
                }
            }

            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(Outbound::Frame(frame)) => {
                        if ws_tx.send(Message::Text(frame.to_string().into())).await.is_err() {
                            tracing::debug!(conn_id = %guard.conn.id(), "ws write failed");
                            break;
                        }
                    }
                    Some(Outbound::Close { code, reason }) => {
                        let _ = send_close(&mut ws_tx, code, &reason).await;
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    guard.release();
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

/// Unregisters a connection exactly once, whether the loop exits normally,
/// through an early return, or by the task being dropped.
struct RegistrationGuard {
    registry: Arc<ConnectionRegistry>,
    identity: Identity,
    conn: Arc<SocketConnection>,
    released: AtomicBool,
}

impl RegistrationGuard {
    fn new(registry: Arc<ConnectionRegistry>, identity: Identity, conn: Arc<SocketConnection>) -> Self {
        Self {
            registry,
            identity,
            conn,
            released: AtomicBool::new(false),
        }
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        self.conn.mark_closed();
        self.registry.unregister(&self.identity, self.conn.as_ref());

        tracing::info!(
            conn_id = %self.conn.id(),
            user_id = %self.identity.subject_id,
            remaining = self.registry.len(),
            "gateway connection closed"
        );
    }
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Send a WebSocket close frame with a code and reason.
async fn send_close(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    code: u16,
    reason: &str,
) -> Result<(), axum::Error> {
    let close_msg = Message::Close(Some(CloseFrame {
        code,
        reason: reason.to_string().into(),
    }));
    ws_tx.send(close_msg).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn identity(subject_id: &str) -> Identity {
        Identity {
            subject_id: subject_id.to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn release_runs_once() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (conn, _rx) = SocketConnection::new();
        registry.register(&identity("usr_1"), conn.clone());

        let guard = RegistrationGuard::new(registry.clone(), identity("usr_1"), conn.clone());
        guard.release();
        assert!(registry.lookup("usr_1").is_none());
        assert_eq!(registry.admin_count(), 0);
        assert!(!conn.is_open());

        // A newer connection registered after the first teardown survives
        // the guard being dropped.
        let (newer, _rx2) = SocketConnection::new();
        registry.register(&identity("usr_1"), newer.clone());
        drop(guard);
        let current = registry.lookup("usr_1").unwrap();
        assert_eq!(current.id(), newer.id());
    }

    #[test]
    fn dropping_guard_unregisters() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (conn, _rx) = SocketConnection::new();
        registry.register(&identity("usr_2"), conn.clone());

        drop(RegistrationGuard::new(registry.clone(), identity("usr_2"), conn));
        assert!(registry.is_empty());
        assert_eq!(registry.admin_count(), 0);
    }

    #[test]
    fn release_only_drops_own_entry_from_counts() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (first, _rx1) = SocketConnection::new();
        let (second, _rx2) = SocketConnection::new();
        registry.register(&identity("usr_4"), first.clone());
        registry.register(&identity("usr_5"), second.clone());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.admin_count(), 2);

        RegistrationGuard::new(registry.clone(), identity("usr_4"), first).release();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.admin_count(), 1);
        assert!(!registry.is_empty());
        assert!(registry.lookup("usr_5").is_some());
    }

    #[test]
    fn stale_guard_leaves_replacement_registered() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (old, _rx1) = SocketConnection::new();
        let (new, _rx2) = SocketConnection::new();

        registry.register(&identity("usr_3"), old.clone());
        let old_guard = RegistrationGuard::new(registry.clone(), identity("usr_3"), old);
        let replaced = registry.register(&identity("usr_3"), new.clone());
        assert!(replaced.is_some());

        old_guard.release();
        assert_eq!(registry.lookup("usr_3").unwrap().id(), new.id());
        assert_eq!(registry.admin_count(), 1);
    }
}

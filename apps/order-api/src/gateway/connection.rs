//! Connection capability used by the registry and event router.
//!
//! The registry never owns a socket. It holds `Arc<dyn Connection>` handles; the
//! socket itself lives in the gateway task that drains the outbound queue.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier used to compare connection handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Minimal capability interface over a live bidirectional channel.
pub trait Connection: Send + Sync {
    fn id(&self) -> ConnectionId;

    /// Queue a text frame. Returns `false` if the channel is already closed.
    fn send(&self, frame: Arc<str>) -> bool;

    fn is_open(&self) -> bool;

    /// Ask the owner of the channel to close it with the given code.
    fn close(&self, code: u16, reason: &str);
}

/// Messages queued for the socket task.
#[derive(Debug, Clone)]
pub enum Outbound {
    Frame(Arc<str>),
    Close { code: u16, reason: String },
}

/// Connection handle backed by an unbounded queue drained by the socket task.
pub struct SocketConnection {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Outbound>,
    open: AtomicBool,
}

impl SocketConnection {
    /// Create a handle and the receiving end the socket task must drain.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Arc::new(Self {
            id: ConnectionId::next(),
            tx,
            open: AtomicBool::new(true),
        });
        (conn, rx)
    }

    /// Mark the handle closed once the socket task has finished.
    pub fn mark_closed(&self) {
        self.open.store(false, Ordering::Release);
    }
}

impl Connection for SocketConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, frame: Arc<str>) -> bool {
        if !self.is_open() {
            return false;
        }
        self.tx.send(Outbound::Frame(frame)).is_ok()
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    fn close(&self, code: u16, reason: &str) {
        if self.open.swap(false, Ordering::AcqRel) {
            let _ = self.tx.send(Outbound::Close {
                code,
                reason: reason.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_ids_are_unique() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn send_queues_frame_while_open() {
        let (conn, mut rx) = SocketConnection::new();
        assert!(conn.send(Arc::from("hello")));
        match rx.recv().await {
            Some(Outbound::Frame(frame)) => assert_eq!(&*frame, "hello"),
            other => panic!("unexpected outbound: {other:?}"),
        }
    }

    #[tokio::test]
    async fn close_queues_close_once_and_blocks_sends() {
        let (conn, mut rx) = SocketConnection::new();
        conn.close(4008, "Session replaced");
        conn.close(4008, "Session replaced");
        assert!(!conn.is_open());
        assert!(!conn.send(Arc::from("late")));

        match rx.recv().await {
            Some(Outbound::Close { code, .. }) => assert_eq!(code, 4008),
            other => panic!("unexpected outbound: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_receiver_closes_connection() {
        let (conn, rx) = SocketConnection::new();
        drop(rx);
        assert!(!conn.is_open());
        assert!(!conn.send(Arc::from("nobody listening")));
    }
}

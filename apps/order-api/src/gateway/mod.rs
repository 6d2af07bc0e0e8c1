//! Real-time gateway: authenticated WebSocket connections and targeted event
//! delivery.

pub mod connection;
pub mod events;
pub mod registry;
pub mod router;
pub mod server;

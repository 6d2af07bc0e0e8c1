//! Clients for third-party services the order flow depends on.

pub mod images;
pub mod payments;

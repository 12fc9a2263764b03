//! HTTP and WebSocket handlers.

pub mod broadcast;
pub mod health;
pub mod tenants;
pub mod ws;

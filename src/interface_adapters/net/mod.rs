// Network adapter for client WebSocket connections.

pub mod client;

pub use client::ws_handler;

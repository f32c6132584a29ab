//! WebSocket layer: live report events for task boards.
//!
//! Clients connect to `/ws`, subscribe to report IDs (or `"*"`) and
//! receive lifecycle events as they happen.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;

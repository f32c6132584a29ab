//! # greenify-server
//!
//! REST and WebSocket backend for community waste reporting.
//!
//! Citizens photograph waste, a vision model classifies it and the report
//! lands on a public task board. Collectors claim reports, upload an
//! "after" photo, and a second model call judges the cleanup. Passing
//! verification credits the collector's reward ledger and sends a
//! notification. User accounts mirror an external identity provider via
//! signed webhooks.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)      Identity provider webhooks
//!     │                                  │
//!     ├── REST handlers (api/)           ├── Signature check (webhook/)
//!     ├── WS handler (ws/)               │
//!     │                                  │
//!     ├── Services (service/) ───────────┘
//!     ├── EventBus (domain/)
//!     ├── Vision model client (ai/)
//!     │
//!     └── Store: PostgreSQL or in-memory (persistence/)
//! ```

pub mod ai;
pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod webhook;
pub mod ws;

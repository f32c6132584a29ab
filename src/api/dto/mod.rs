//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain records (`Report`, `Notification`, ...) are returned as-is; the
//! types here cover query strings, request bodies, multipart form
//! documentation and list envelopes.

pub mod chat_dto;
pub mod common_dto;
pub mod notification_dto;
pub mod report_dto;
pub mod reward_dto;

pub use chat_dto::*;
pub use common_dto::*;
pub use notification_dto::*;
pub use report_dto::*;
pub use reward_dto::*;

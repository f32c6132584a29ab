//! Vision model integration: image uploads, prompts, the HTTP client, and
//! the decoder that turns free-text replies into validated structures.

pub mod client;
pub mod decoder;
pub mod image;
pub mod prompt;
pub mod schema;

pub use client::{GeminiClient, VisionModel};
pub use decoder::DecodeError;
pub use image::{ImageUpload, InlineImage, MAX_IMAGE_BYTES};
pub use schema::{CleanupJudgment, CleanupStatus, RejectionReason, WasteClassification, WasteDetails};

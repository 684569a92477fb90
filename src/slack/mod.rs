//! All Slack-specific functionality

pub mod client;
pub mod interaction;
pub mod modal_builder;
pub mod response_builder;

// Re-export main types for convenience
pub use client::{ChatPlatform, SlackClient};
pub use interaction::{DialogStep, Interaction};

//! API Lambda handler and request processing

pub mod dispatch;
pub mod github_webhook;
pub mod handler;
pub mod helpers;
pub mod interactive_handler;
pub mod parsing;
pub mod signature;

// Re-export the main handler for convenience
pub use handler::handler;

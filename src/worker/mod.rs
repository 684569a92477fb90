//! Worker Lambda: runs queued release tasks

pub mod handler;
pub mod notify;

pub use handler::{handler, run_task};
pub use notify::Notifier;

/// Releasebot - a ChatOps bot that cuts releases and manages review apps.
///
/// This crate implements a two-Lambda architecture:
/// 1. An API Lambda that receives signed GitHub webhooks and Slack interactions,
///    drives the release dialog and queues confirmed release tasks
/// 2. A Worker Lambda that runs queued tasks (publish, deploy) and reports the
///    outcome to the release channel
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda for serverless execution
/// - SQS for task queuing between Lambdas
/// - GitHub for tags, commit history and pull-request comments
/// - Scalingo for review apps and deployments
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use releasebot::ReleaseBot;
/// use releasebot::core::config::AppConfig;
/// use releasebot::core::models::ReleaseType;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Set up structured logging
///     releasebot::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let bot = ReleaseBot::new(config);
///
///     // Publish a minor release and deploy it to the staging apps
///     let outcome = bot
///         .orchestrator()
///         .publish_and_deploy("pix", ReleaseType::Minor)
///         .await;
///     println!("{}", outcome.message());
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod api;
pub mod bot;
pub mod clients;
pub mod core;
pub mod errors;
pub mod features;
pub mod slack;
pub mod worker;

pub use bot::{Platforms, ReleaseBot};
pub use errors::BotError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. It should be called once at the start of each
/// Lambda binary; later calls leave the first subscriber in place.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your Lambda handler
/// releasebot::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

//! Webhook authenticity checks for GitHub and Slack.
//!
//! Both platforms sign with HMAC-SHA256; digests are compared in constant time
//! through `Mac::verify_slice`.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::error;

use crate::errors::BotError;

type HmacSha256 = Hmac<Sha256>;

const SLACK_SIGNATURE_VERSION: &str = "v0";
/// Oldest Slack request accepted, in seconds.
pub const MAX_TIMESTAMP_AGE_SECS: i64 = 300;
/// Tolerated clock skew for timestamps in the future, in seconds.
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

fn new_mac(secret: &str) -> Result<HmacSha256, BotError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BotError::ConfigError(format!("Failed to create HMAC: {e}")))
}

/// Verify `X-Hub-Signature-256` (`sha256=<hex>`) against the raw request body.
///
/// # Errors
///
/// Returns `Unauthorized` when the header is absent or does not match.
pub fn verify_github_signature(
    secret: &str,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), BotError> {
    let Some(signature) = signature.filter(|s| !s.is_empty()) else {
        return Err(BotError::Unauthorized("Github signature is empty.".to_string()));
    };

    let hex_digest = signature.split_once('=').map_or("", |(_, digest)| digest);
    let expected = hex::decode(hex_digest).map_err(|_| {
        BotError::Unauthorized("Github signature verification failed. Malformed signature.".to_string())
    })?;

    let mut mac = new_mac(secret)?;
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| {
        error!("GitHub signature mismatch");
        BotError::Unauthorized(
            "Github signature verification failed. Signature mismatch.".to_string(),
        )
    })
}

/// Verify `X-Slack-Signature` over `v0:{timestamp}:{body}`, rejecting
/// timestamps outside the replay window around `now` (Unix seconds).
///
/// # Errors
///
/// Returns `Unauthorized` when a header is absent, the timestamp is stale or
/// malformed, or the signature does not match.
pub fn verify_slack_signature(
    secret: &str,
    body: &str,
    timestamp: Option<&str>,
    signature: Option<&str>,
    now: i64,
) -> Result<(), BotError> {
    let Some(timestamp) = timestamp else {
        return Err(BotError::Unauthorized(
            "Missing X-Slack-Request-Timestamp header".to_string(),
        ));
    };
    let Some(signature) = signature else {
        return Err(BotError::Unauthorized(
            "Missing X-Slack-Signature header".to_string(),
        ));
    };

    let ts: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| BotError::Unauthorized("Invalid Slack request timestamp".to_string()))?;
    let too_old = now.checked_sub(ts).is_none_or(|age| age > MAX_TIMESTAMP_AGE_SECS);
    let too_new = ts.checked_sub(now).is_none_or(|skew| skew > MAX_CLOCK_SKEW_SECS);
    if too_old || too_new {
        error!("Timestamp out of range, potential replay attack");
        return Err(BotError::Unauthorized(
            "Slack request timestamp out of range".to_string(),
        ));
    }

    let Some(hex_digest) = signature.strip_prefix("v0=") else {
        return Err(BotError::Unauthorized(
            "Unsupported Slack signature version".to_string(),
        ));
    };
    let expected = hex::decode(hex_digest)
        .map_err(|_| BotError::Unauthorized("Malformed Slack signature".to_string()))?;

    let mut mac = new_mac(secret)?;
    mac.update(format!("{SLACK_SIGNATURE_VERSION}:{timestamp}:{body}").as_bytes());
    mac.verify_slice(&expected).map_err(|_| {
        error!("Slack signature verification failed");
        BotError::Unauthorized("Invalid Slack signature".to_string())
    })
}

/// [`verify_slack_signature`] against the current time.
///
/// # Errors
///
/// See [`verify_slack_signature`].
pub fn verify_slack_request(
    secret: &str,
    body: &str,
    timestamp: Option<&str>,
    signature: Option<&str>,
) -> Result<(), BotError> {
    verify_slack_signature(secret, body, timestamp, signature, Utc::now().timestamp())
}

/// `sha256=<hex>` as GitHub would send it.
#[must_use]
pub fn compute_github_signature(secret: &str, body: &[u8]) -> String {
    let Ok(mut mac) = new_mac(secret) else {
        return String::new();
    };
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// `v0=<hex>` as Slack would send it.
#[must_use]
pub fn compute_slack_signature(secret: &str, timestamp: &str, body: &str) -> String {
    let Ok(mut mac) = new_mac(secret) else {
        return String::new();
    };
    mac.update(format!("{SLACK_SIGNATURE_VERSION}:{timestamp}:{body}").as_bytes());
    format!("{SLACK_SIGNATURE_VERSION}={}", hex::encode(mac.finalize().into_bytes()))
}

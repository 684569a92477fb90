//! Block Kit views for the release dialog.

use serde_json::{Value, json};

use crate::core::models::{ReleaseType, TargetEnvironment};

pub const PUBLISH_RELEASE_SHORTCUT: &str = "publish-release";
pub const DEPLOY_RELEASE_SHORTCUT: &str = "deploy-release";

pub const RELEASE_TYPE_SELECTION: &str = "release-type-selection";
pub const RELEASE_TAG_SELECTION: &str = "release-tag-selection";
pub const RELEASE_PUBLICATION_CONFIRMATION: &str = "release-publication-confirmation";
pub const RELEASE_DEPLOYMENT_CONFIRMATION: &str = "release-deployment-confirmation";

pub const RELEASE_TYPE_BLOCK: &str = "publish-release-type";
pub const RELEASE_TYPE_ACTION: &str = "release-type-option";
pub const RELEASE_TAG_BLOCK: &str = "deploy-release-tag";
pub const RELEASE_TAG_ACTION: &str = "release-tag-value";

fn plain_text(text: &str) -> Value {
    json!({ "type": "plain_text", "text": text })
}

fn mrkdwn_section(text: &str) -> Value {
    json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": text }
    })
}

fn release_type_option(release_type: ReleaseType) -> Value {
    let label = match release_type {
        ReleaseType::Patch => "Patch",
        ReleaseType::Minor => "Minor",
        ReleaseType::Major => "Major",
    };
    json!({ "text": plain_text(label), "value": release_type.as_str() })
}

/// Modal opened by the `publish-release` shortcut: pick patch, minor or major.
#[must_use]
pub fn build_release_type_modal() -> Value {
    json!({
        "type": "modal",
        "callback_id": RELEASE_TYPE_SELECTION,
        "title": plain_text("Publish a release"),
        "submit": plain_text("Publish"),
        "close": plain_text("Cancel"),
        "blocks": [
            mrkdwn_section(
                "Releases follow _Semantic Versioning_:\n\
                 - *patch*: bug fixes only\n\
                 - *minor*: at least one technical or functional change\n\
                 - *major*: at least one major architectural change"
            ),
            { "type": "divider" },
            {
                "type": "input",
                "block_id": RELEASE_TYPE_BLOCK,
                "label": plain_text("Release type"),
                "element": {
                    "action_id": RELEASE_TYPE_ACTION,
                    "type": "static_select",
                    "placeholder": plain_text("Select an item"),
                    "initial_option": release_type_option(ReleaseType::Minor),
                    "options": [
                        release_type_option(ReleaseType::Minor),
                        release_type_option(ReleaseType::Patch),
                        release_type_option(ReleaseType::Major),
                    ]
                }
            }
        ]
    })
}

/// Modal opened by the `deploy-release` shortcut: free-text release tag.
#[must_use]
pub fn build_release_tag_modal() -> Value {
    json!({
        "type": "modal",
        "callback_id": RELEASE_TAG_SELECTION,
        "title": plain_text("Deploy a release"),
        "submit": plain_text("Deploy"),
        "close": plain_text("Cancel"),
        "blocks": [
            {
                "type": "input",
                "block_id": RELEASE_TAG_BLOCK,
                "label": plain_text("Release tag"),
                "element": {
                    "type": "plain_text_input",
                    "action_id": RELEASE_TAG_ACTION,
                    "placeholder": plain_text("e.g. v2.130.0")
                }
            }
        ]
    })
}

/// Warning shown when the sensitive configuration file changed since the last release.
#[must_use]
pub fn config_drift_warning(config_file_path: &str, target: TargetEnvironment) -> String {
    let file_name = config_file_path
        .rsplit('/')
        .next()
        .unwrap_or(config_file_path);
    let environment = match target {
        TargetEnvironment::Staging => "STAGING",
        TargetEnvironment::Production => "PRODUCTION",
    };
    format!(
        ":warning: There were additions/removals in *{file_name}*. \
         Make sure every environment variable is up to date on *Scalingo {environment}*."
    )
}

/// Warning shown when the CI check for the requested tag is not green.
#[must_use]
pub fn build_status_warning(check_name: &str, tag: &str) -> String {
    format!(":warning: The *{check_name}* CI check is not green for *{tag}*.")
}

/// Confirmation modal. `private_metadata` is the only state carried to the next step
/// and must come back unchanged on submission.
#[must_use]
pub fn build_confirmation_modal(
    callback_id: &str,
    private_metadata: &str,
    warnings: &[String],
    text: &str,
) -> Value {
    let mut blocks: Vec<Value> = warnings.iter().map(|w| mrkdwn_section(w)).collect();
    blocks.push(mrkdwn_section(text));

    json!({
        "type": "modal",
        "callback_id": callback_id,
        "private_metadata": private_metadata,
        "title": plain_text("Confirmation"),
        "submit": plain_text("🚀 Go!"),
        "close": plain_text("Cancel"),
        "blocks": blocks
    })
}

#[must_use]
pub fn build_publication_confirmation_modal(
    release_type: ReleaseType,
    warnings: &[String],
) -> Value {
    build_confirmation_modal(
        RELEASE_PUBLICATION_CONFIRMATION,
        release_type.as_str(),
        warnings,
        &format!(
            "You are about to publish a *{release_type}* release and deploy it to staging. Are you sure?"
        ),
    )
}

#[must_use]
pub fn build_deployment_confirmation_modal(tag: &str, warnings: &[String]) -> Value {
    build_confirmation_modal(
        RELEASE_DEPLOYMENT_CONFIRMATION,
        tag,
        warnings,
        &format!(
            "You are about to deploy version *{tag}* to production. \
             This is a critical operation. Are you sure?"
        ),
    )
}

//! Typed Slack interactive payloads and the dialog steps they encode.

use serde::Deserialize;
use std::collections::HashMap;

use super::modal_builder::{
    RELEASE_DEPLOYMENT_CONFIRMATION, RELEASE_PUBLICATION_CONFIRMATION, RELEASE_TAG_ACTION,
    RELEASE_TAG_BLOCK, RELEASE_TAG_SELECTION, RELEASE_TYPE_ACTION, RELEASE_TYPE_BLOCK,
    RELEASE_TYPE_SELECTION,
};
use crate::core::models::ReleaseType;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionUser {
    #[serde(default)]
    pub id: String,
}

/// Present on submissions of modals whose inputs enable `response_url_enabled`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseUrl {
    pub response_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOption {
    pub value: String,
}

/// `view.state.values.{block_id}.{action_id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionState {
    pub value: Option<String>,
    pub selected_option: Option<SelectedOption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, ActionState>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedView {
    #[serde(default)]
    pub callback_id: String,
    #[serde(default)]
    pub private_metadata: String,
    #[serde(default)]
    pub state: ViewState,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
    Shortcut {
        callback_id: String,
        #[serde(default)]
        trigger_id: String,
        #[serde(default)]
        user: InteractionUser,
    },
    ViewSubmission {
        view: SubmittedView,
        #[serde(default)]
        user: InteractionUser,
        #[serde(default)]
        response_urls: Vec<ResponseUrl>,
    },
    ViewClosed,
    #[serde(other)]
    Unsupported,
}

/// A `view_submission` classified by its `callback_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogStep {
    ReleaseTypeSelection(ReleaseType),
    ReleaseTagSelection(String),
    PublicationConfirmation(ReleaseType),
    DeploymentConfirmation(String),
}

impl SubmittedView {
    fn action_state(&self, block_id: &str, action_id: &str) -> Option<&ActionState> {
        self.state.values.get(block_id)?.get(action_id)
    }

    /// Map the submission onto the dialog graph. Returns `None` for views
    /// this bot does not own.
    #[must_use]
    pub fn dialog_step(&self) -> Option<DialogStep> {
        match self.callback_id.as_str() {
            RELEASE_TYPE_SELECTION => {
                let selected = self
                    .action_state(RELEASE_TYPE_BLOCK, RELEASE_TYPE_ACTION)
                    .and_then(|s| s.selected_option.as_ref())
                    .map_or("", |o| o.value.as_str());
                Some(DialogStep::ReleaseTypeSelection(
                    ReleaseType::parse_or_default(selected),
                ))
            }
            RELEASE_TAG_SELECTION => {
                let tag = self
                    .action_state(RELEASE_TAG_BLOCK, RELEASE_TAG_ACTION)
                    .and_then(|s| s.value.as_deref())
                    .unwrap_or("")
                    .trim()
                    .to_string();
                Some(DialogStep::ReleaseTagSelection(tag))
            }
            RELEASE_PUBLICATION_CONFIRMATION => Some(DialogStep::PublicationConfirmation(
                ReleaseType::parse_or_default(&self.private_metadata),
            )),
            RELEASE_DEPLOYMENT_CONFIRMATION => Some(DialogStep::DeploymentConfirmation(
                self.private_metadata.clone(),
            )),
            _ => None,
        }
    }
}

//! Message model shared by the webhook dispatcher and the Send API client.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A message delivered by the webhook: either user text (optionally with a quick-reply payload)
/// or a postback from a button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Page-scoped id of the user who sent the message.
    pub sender_id: String,
    /// Id of the page that received the message.
    pub receiver_id: String,
    pub text: Option<String>,
    pub attachments: Option<Vec<PathBuf>>,
    /// Quick-reply or postback payload, if the user tapped one.
    pub payload: Option<String>,
}

impl Message {
    pub fn new(
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        text: Option<String>,
        payload: Option<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            text,
            attachments: None,
            payload,
        }
    }
}

/// Suggested-response chip attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReply {
    pub title: String,
    pub payload: String,
    pub image_url: Option<String>,
}

impl QuickReply {
    pub fn new(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

const POSTBACK_BUTTON_TYPE: &str = "postback";

/// Button of a button template; tapping it delivers `payload` as a postback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostbackButton {
    pub title: String,
    pub payload: String,
    pub button_type: String,
}

impl PostbackButton {
    pub fn new(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
            button_type: POSTBACK_BUTTON_TYPE.to_string(),
        }
    }
}

/// Classification of an outbound message required by the Send API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessagingType {
    Response,
    Update,
    MessageTag,
}

/// Typing indicator or read receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    TypingOn,
    TypingOff,
    MarkSeen,
}

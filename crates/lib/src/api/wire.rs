//! Send API request and response bodies.

use crate::models::{MessagingType, PostbackButton, QuickReply, SenderAction};
use serde::{Deserialize, Serialize};

pub(crate) const MESSAGES_ENDPOINT: &str = "me/messages";
pub(crate) const PROFILE_ENDPOINT: &str = "me/messenger_profile";

/// Any body the client POSTs to the Graph API.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Message(MessageRequest),
    SenderAction(SenderActionRequest),
    Profile(ProfileRequest),
}

impl Envelope {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Envelope::Message(_) | Envelope::SenderAction(_) => MESSAGES_ENDPOINT,
            Envelope::Profile(_) => PROFILE_ENDPOINT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    pub messaging_type: MessagingType,
    pub recipient: Recipient,
    pub message: MessageBody,
}

impl MessageRequest {
    pub fn new(messaging_type: MessagingType, recipient_id: &str, message: MessageBody) -> Self {
        Self {
            messaging_type,
            recipient: Recipient {
                id: recipient_id.to_string(),
            },
            message,
        }
    }
}

/// `message` object. Text sits here for plain and quick-reply messages; for button
/// templates it is carried inside the template payload instead.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<WireQuickReply>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl MessageBody {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn button_template(text: &str, buttons: &[PostbackButton]) -> Self {
        Self {
            attachment: Some(Attachment::Template(ButtonTemplate {
                template_type: TemplateType::Button,
                text: text.to_string(),
                buttons: buttons.iter().map(WireButton::from).collect(),
            })),
            ..Default::default()
        }
    }

    pub fn media(kind: AttachmentType, url: String) -> Self {
        let payload = MediaPayload {
            url,
            is_reusable: true,
        };
        let attachment = match kind {
            AttachmentType::Image => Attachment::Image(payload),
            AttachmentType::Video => Attachment::Video(payload),
            AttachmentType::Audio => Attachment::Audio(payload),
            AttachmentType::File => Attachment::File(payload),
        };
        Self {
            attachment: Some(attachment),
            ..Default::default()
        }
    }

    pub fn with_quick_replies(mut self, replies: &[QuickReply]) -> Self {
        self.quick_replies = Some(replies.iter().map(WireQuickReply::from).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireQuickReply {
    pub content_type: &'static str,
    pub title: String,
    pub payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&QuickReply> for WireQuickReply {
    fn from(r: &QuickReply) -> Self {
        Self {
            content_type: "text",
            title: r.title.clone(),
            payload: r.payload.clone(),
            image_url: r.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireButton {
    #[serde(rename = "type")]
    pub button_type: String,
    pub payload: String,
    pub title: String,
}

impl From<&PostbackButton> for WireButton {
    fn from(b: &PostbackButton) -> Self {
        Self {
            button_type: b.button_type.clone(),
            payload: b.payload.clone(),
            title: b.title.clone(),
        }
    }
}

/// Kind of media attachment sent by URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    #[default]
    Image,
    Video,
    Audio,
    File,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum Attachment {
    Template(ButtonTemplate),
    Image(MediaPayload),
    Video(MediaPayload),
    Audio(MediaPayload),
    File(MediaPayload),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Button,
}

#[derive(Debug, Clone, Serialize)]
pub struct ButtonTemplate {
    pub template_type: TemplateType,
    pub text: String,
    pub buttons: Vec<WireButton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaPayload {
    pub url: String,
    pub is_reusable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SenderActionRequest {
    pub recipient: Recipient,
    pub sender_action: SenderAction,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProfileRequest {
    GetStarted { get_started: GetStarted },
    Greeting { greeting: Vec<Greeting> },
}

#[derive(Debug, Clone, Serialize)]
pub struct GetStarted {
    pub payload: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Greeting {
    pub locale: String,
    pub text: String,
}

/// Successful Send API response; `message_id` is absent for profile updates.
#[derive(Debug, Deserialize)]
pub(crate) struct SendResponse {
    #[serde(default)]
    pub message_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: super::MessengerError,
}

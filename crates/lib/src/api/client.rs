//! Send API client (POST me/messages, me/messenger_profile).

use crate::api::staging::AttachmentStager;
use crate::api::wire::{
    AttachmentType, Envelope, ErrorEnvelope, GetStarted, Greeting, MessageBody, MessageRequest,
    ProfileRequest, Recipient, SendResponse, SenderActionRequest,
};
use crate::api::SendError;
use crate::config::{self, Config};
use crate::models::{Message, MessagingType, PostbackButton, QuickReply, SenderAction};
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maximum number of buttons in a button template.
pub const MAX_BUTTONS: usize = 3;
/// Maximum text length of a button template, in characters.
pub const MAX_BUTTON_TEXT_CHARS: usize = 640;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Optional parts of an outgoing message. Empty lists mean "not set".
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Reply to a user message (`RESPONSE`) instead of a tagged message (`MESSAGE_TAG`).
    pub reply: bool,
    /// Local images sent as separate messages before the text.
    pub images: Vec<PathBuf>,
    pub quick_replies: Vec<QuickReply>,
    pub buttons: Vec<PostbackButton>,
}

impl SendOptions {
    pub fn reply() -> Self {
        Self {
            reply: true,
            ..Default::default()
        }
    }

    pub fn images(mut self, images: Vec<PathBuf>) -> Self {
        self.images = images;
        self
    }

    pub fn quick_replies(mut self, replies: Vec<QuickReply>) -> Self {
        self.quick_replies = replies;
        self
    }

    pub fn buttons(mut self, buttons: Vec<PostbackButton>) -> Self {
        self.buttons = buttons;
        self
    }
}

/// Client for the Messenger Send API. Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
    stager: AttachmentStager,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("stager", &self.stager)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(access_token: impl Into<String>, base_url: Option<String>) -> Result<Self, SendError> {
        Self::with_timeout(access_token, base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        access_token: impl Into<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SendError> {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| config::DEFAULT_API_BASE_URL.to_string());
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SendError::Request)?;
        Ok(Self {
            base_url,
            access_token: access_token.into(),
            client,
            stager: AttachmentStager::default(),
        })
    }

    /// Build a client from config; fails when no access token is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let token = config::resolve_access_token(config)
            .context("access token not configured (set accessToken or FB_TOKEN)")?;
        let client = Self::with_timeout(
            token,
            Some(config.api_base_url.clone()),
            config.request_timeout(),
        )?
        .with_attachment_staging(AttachmentStager::new(
            config.attachment_location.clone(),
            config.public_attachment_url.clone(),
        ));
        Ok(client)
    }

    pub fn with_attachment_staging(mut self, stager: AttachmentStager) -> Self {
        self.stager = stager;
        self
    }

    /// Send a typing indicator or read receipt.
    pub async fn send_action(&self, recipient_id: &str, action: SenderAction) -> Result<bool, SendError> {
        let envelope = Envelope::SenderAction(SenderActionRequest {
            recipient: Recipient {
                id: recipient_id.to_string(),
            },
            sender_action: action,
        });
        self.send_request(&envelope).await?;
        Ok(true)
    }

    /// Reply to the sender of `message` with messaging type `RESPONSE`.
    pub async fn send_reply(
        &self,
        message: &Message,
        text: &str,
        options: SendOptions,
    ) -> Result<bool, SendError> {
        let options = SendOptions {
            reply: true,
            ..options
        };
        self.send_message(&message.sender_id, text, options).await
    }

    /// Send a text message. Images go out first, one message each; buttons turn the message
    /// into a button template. Returns whether the platform reported a `message_id`.
    pub async fn send_message(
        &self,
        recipient_id: &str,
        text: &str,
        options: SendOptions,
    ) -> Result<bool, SendError> {
        validate(text, &options)?;

        let messaging_type = if options.reply {
            MessagingType::Response
        } else {
            MessagingType::MessageTag
        };

        for image in &options.images {
            self.send_attachment(messaging_type, recipient_id, image, AttachmentType::Image)
                .await?;
        }

        let mut body = if options.buttons.is_empty() {
            MessageBody::text(text)
        } else {
            MessageBody::button_template(text, &options.buttons)
        };
        if !options.quick_replies.is_empty() {
            body = body.with_quick_replies(&options.quick_replies);
        }

        let envelope = Envelope::Message(MessageRequest::new(messaging_type, recipient_id, body));
        let res = self.send_request(&envelope).await?;
        Ok(res.message_id.is_some())
    }

    /// Send local files one by one as `MESSAGE_TAG` attachments. Returns true if every send
    /// reported a `message_id`. Stops at the first error; earlier sends are not undone.
    pub async fn send_attachments(
        &self,
        recipient_id: &str,
        attachments: &[PathBuf],
        file_type: AttachmentType,
    ) -> Result<bool, SendError> {
        let mut all_delivered = true;
        for attachment in attachments {
            let delivered = self
                .send_attachment(MessagingType::MessageTag, recipient_id, attachment, file_type)
                .await?;
            all_delivered &= delivered;
        }
        Ok(all_delivered)
    }

    /// Payload delivered as a postback when a user taps "Get Started".
    pub async fn set_get_started_payload(&self, payload: &str) -> Result<(), SendError> {
        let envelope = Envelope::Profile(ProfileRequest::GetStarted {
            get_started: GetStarted {
                payload: payload.to_string(),
            },
        });
        self.send_request(&envelope).await?;
        Ok(())
    }

    /// Default-locale greeting shown before a conversation starts.
    pub async fn set_greeting_text(&self, text: &str) -> Result<(), SendError> {
        let envelope = Envelope::Profile(ProfileRequest::Greeting {
            greeting: vec![Greeting {
                locale: "default".to_string(),
                text: text.to_string(),
            }],
        });
        self.send_request(&envelope).await?;
        Ok(())
    }

    async fn send_attachment(
        &self,
        messaging_type: MessagingType,
        recipient_id: &str,
        attachment: &Path,
        file_type: AttachmentType,
    ) -> Result<bool, SendError> {
        let url = self.stager.stage(attachment).await?;
        let body = MessageBody::media(file_type, url);
        let envelope = Envelope::Message(MessageRequest::new(messaging_type, recipient_id, body));
        let res = self.send_request(&envelope).await?;
        Ok(res.message_id.is_some())
    }

    /// POST the envelope and map the response: 2xx decodes the body, anything else must carry
    /// an `error` object.
    async fn send_request(&self, envelope: &Envelope) -> Result<SendResponse, SendError> {
        let url = format!("{}/{}", self.base_url, envelope.endpoint());
        log::debug!("send to {}?access_token=***", url);
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "send body: {}",
                serde_json::to_string(envelope).unwrap_or_default()
            );
        }

        let res = self
            .client
            .post(&url)
            .query(&[("access_token", self.access_token.as_str())])
            .json(envelope)
            .send()
            .await
            .map_err(|e| SendError::Request(e.without_url()))?;
        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|e| SendError::Request(e.without_url()))?;
        log::debug!("messenger api response: {}", status);

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        log::warn!(
            "messenger api error {}: {}",
            status,
            String::from_utf8_lossy(&body)
        );
        match serde_json::from_slice::<ErrorEnvelope>(&body) {
            Ok(e) => Err(SendError::Platform(e.error)),
            Err(_) => Err(SendError::Protocol(format!(
                "status {} without an error object",
                status
            ))),
        }
    }
}

/// Local checks done before any request: buttons and quick replies are exclusive, a button
/// template has at most 3 buttons and 640 characters of text.
pub fn validate(text: &str, options: &SendOptions) -> Result<(), SendError> {
    if options.buttons.is_empty() {
        return Ok(());
    }
    if !options.quick_replies.is_empty() {
        return Err(SendError::InvalidArgument(
            "buttons and quick replies cannot be combined in one message".to_string(),
        ));
    }
    if options.buttons.len() > MAX_BUTTONS {
        return Err(SendError::InvalidArgument(format!(
            "at most {} buttons are supported, got {}",
            MAX_BUTTONS,
            options.buttons.len()
        )));
    }
    let chars = text.chars().count();
    if chars > MAX_BUTTON_TEXT_CHARS {
        return Err(SendError::InvalidArgument(format!(
            "button template text is limited to {} characters, got {}",
            MAX_BUTTON_TEXT_CHARS, chars
        )));
    }
    Ok(())
}

//! Webhook POST body and its normalization into [`Message`]s.

use crate::models::Message;
use serde::Deserialize;
use serde_json::Value;

/// Webhook POST body: `{"object": "page", "entry": [{"messaging": [...]}]}`.
///
/// Entries and events are kept as raw JSON and decoded one at a time, so a single
/// malformed event does not cost the rest of the batch.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub entry: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub messaging: Vec<Value>,
}

/// One item of `entry[].messaging`. Only text messages and postbacks are modelled;
/// delivery and read receipts deserialize with both fields empty.
#[derive(Debug, Deserialize)]
pub struct MessagingEvent {
    #[serde(default)]
    pub sender: Option<Participant>,
    #[serde(default)]
    pub recipient: Option<Participant>,
    #[serde(default)]
    pub message: Option<EventMessage>,
    #[serde(default)]
    pub postback: Option<Postback>,
}

#[derive(Debug, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(default)]
    pub text: Option<String>,
    /// Set on copies of messages the page itself sent.
    #[serde(default)]
    pub is_echo: bool,
    #[serde(default)]
    pub quick_reply: Option<QuickReplyPayload>,
}

#[derive(Debug, Deserialize)]
pub struct QuickReplyPayload {
    pub payload: String,
}

#[derive(Debug, Deserialize)]
pub struct Postback {
    #[serde(default)]
    pub payload: Option<String>,
}

impl MessagingEvent {
    /// Normalize into a [`Message`]. A `message` wins over a `postback`; echoes, events with
    /// neither, without text, or without sender/recipient yield `None`.
    pub fn to_message(&self) -> Option<Message> {
        let sender = self.sender.as_ref()?;
        let recipient = self.recipient.as_ref()?;
        if let Some(ref msg) = self.message {
            if msg.is_echo {
                return None;
            }
            let text = msg.text.clone()?;
            let payload = msg.quick_reply.as_ref().map(|q| q.payload.clone());
            return Some(Message::new(&sender.id, &recipient.id, Some(text), payload));
        }
        let payload = self.postback.as_ref()?.payload.clone()?;
        Some(Message::new(&sender.id, &recipient.id, None, Some(payload)))
    }
}

impl WebhookBody {
    /// All messages in delivery order; unmodelled or undecodable events are dropped.
    pub fn messages(&self) -> Vec<Message> {
        self.entry
            .iter()
            .filter_map(|e| match Entry::deserialize(e) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::debug!("skipping undecodable webhook entry: {}", err);
                    None
                }
            })
            .flat_map(|entry| entry.messaging)
            .filter_map(|ev| {
                let event = match MessagingEvent::deserialize(&ev) {
                    Ok(event) => event,
                    Err(err) => {
                        log::debug!("skipping undecodable webhook event: {}", err);
                        return None;
                    }
                };
                let m = event.to_message();
                if m.is_none() {
                    log::debug!(
                        "skipping webhook event from {} without text message or postback",
                        event.sender.as_ref().map(|s| s.id.as_str()).unwrap_or("unknown sender")
                    );
                }
                m
            })
            .collect()
    }
}

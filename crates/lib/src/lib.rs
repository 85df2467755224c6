//! Simple Facebook Messenger bot library: webhook dispatcher and Send API client.
//!
//! [`Messenger`] serves the webhook and hands each inbound [`Message`] to a
//! [`MessageHandler`]; [`Client`] sends text, images, quick replies, button
//! templates, and typing indicators.

pub mod api;
pub mod config;
pub mod models;
pub mod webhook;

pub use api::{Client, MessengerError, SendError, SendOptions};
pub use models::{Message, MessagingType, PostbackButton, QuickReply, SenderAction};
pub use webhook::{MessageHandler, Messenger};

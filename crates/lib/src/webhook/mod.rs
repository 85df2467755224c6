//! Inbound side: webhook verification and event delivery.
//!
//! GET requests complete the subscription handshake; POST requests are parsed into
//! [`Message`](crate::models::Message)s and each is handed to the registered
//! [`MessageHandler`] on a detached task.

mod events;
mod handler;
mod server;

pub use events::{Entry, EventMessage, MessagingEvent, Participant, Postback, QuickReplyPayload, WebhookBody};
pub use handler::MessageHandler;
pub use server::Messenger;

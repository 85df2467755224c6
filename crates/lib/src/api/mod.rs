//! Outbound side: Send API client, wire schema, and attachment staging.
//!
//! Every call validates locally first, then issues one POST per wire message
//! (N+1 for a text message with N images). Failures surface immediately; there are no retries.

mod client;
mod error;
mod staging;
pub mod wire;

pub use client::{validate, Client, SendOptions, MAX_BUTTONS, MAX_BUTTON_TEXT_CHARS};
pub use error::{MessengerError, SendError};
pub use staging::AttachmentStager;
pub use wire::AttachmentType;

//! Demo bots served by `fbmessenger echo` and `fbmessenger buttons`.

use async_trait::async_trait;
use fbmessenger::{Client, Message, MessageHandler, PostbackButton, SendOptions};

const ISSUES_URL: &str = "https://github.com/eknoes/simple-fbmessenger/issues";

/// Replies to every text message with the same text.
pub struct EchoBot {
    client: Client,
}

impl EchoBot {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageHandler for EchoBot {
    async fn handle(&self, message: Message) -> anyhow::Result<()> {
        let Some(ref text) = message.text else {
            return Ok(());
        };
        self.client
            .send_reply(&message, text, SendOptions::default())
            .await?;
        Ok(())
    }
}

/// Asks whether the user likes the library and answers the tapped button.
pub struct ButtonBot {
    client: Client,
}

impl ButtonBot {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn answer(message: &Message) -> (String, SendOptions) {
        match message.payload.as_deref() {
            None => (
                "Do you like this library?".to_string(),
                SendOptions::default().buttons(vec![
                    PostbackButton::new("Of course!", "yes"),
                    PostbackButton::new("I found this bug...", "bug"),
                ]),
            ),
            Some("yes") => ("Thanks!".to_string(), SendOptions::default()),
            Some(_) => (
                format!("Oh no... You can help here: {}", ISSUES_URL),
                SendOptions::default(),
            ),
        }
    }
}

#[async_trait]
impl MessageHandler for ButtonBot {
    async fn handle(&self, message: Message) -> anyhow::Result<()> {
        let (text, options) = Self::answer(&message);
        self.client.send_reply(&message, &text, options).await?;
        Ok(())
    }
}

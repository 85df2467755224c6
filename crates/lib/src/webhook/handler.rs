//! Message callback and its detached execution.

use crate::models::Message;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Called once per inbound message. Runs on its own task; the webhook response does not wait for it.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    async fn handle(&self, message: Message) -> anyhow::Result<()>;

    /// Reports a failed [`handle`](Self::handle). Default logs a warning.
    fn on_error(&self, sender_id: &str, error: &anyhow::Error) {
        log::warn!("message handler failed for sender {}: {:#}", sender_id, error);
    }
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, message: Message) -> anyhow::Result<()> {
        (self)(message).await
    }
}

/// Run the handler on a detached task. Errors go to `on_error`, panics are logged.
pub(crate) fn dispatch(handler: Arc<dyn MessageHandler>, message: Message) {
    let sender_id = message.sender_id.clone();
    let task = {
        let handler = handler.clone();
        tokio::spawn(async move { handler.handle(message).await })
    };
    tokio::spawn(async move {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => handler.on_error(&sender_id, &e),
            Err(e) if e.is_panic() => {
                log::error!("message handler panicked for sender {}", sender_id);
            }
            Err(e) => log::debug!("message handler for sender {} cancelled: {}", sender_id, e),
        }
    });
}

//! Message queue consumer boundary

use async_trait::async_trait;

use crate::error::Result;

/// A received message: a document key plus the handle that acknowledges it
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Message body, carrying the object-storage key of a document
    pub body: String,
    /// Acknowledgment handle; deleting by handle acknowledges the message
    pub receipt_handle: String,
}

/// Queue consumer interface.
///
/// `receive_messages` returns a bounded batch after a bounded wait; a message
/// that is never deleted becomes visible again once the queue's visibility
/// timeout elapses, so consumers must tolerate redelivery.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Receive up to the configured batch of messages, waiting at most the
    /// configured bound. An empty vec means the queue had nothing to deliver.
    async fn receive_messages(&self) -> Result<Vec<QueueMessage>>;

    /// Acknowledge a message by its receipt handle.
    async fn delete_message(&self, receipt_handle: &str) -> Result<()>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

use tokio::sync::mpsc::Sender;

use crate::message::Message;
use crate::publisher::{PublishError, PublishedMessage, Publisher};

/// Forwards messages into a Tokio channel for an async transport task.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: Sender<PublishedMessage>,
}

impl ChannelPublisher {
    pub fn new(sender: Sender<PublishedMessage>) -> Self {
        Self { sender }
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, message: &Message, status: &str) -> Result<(), PublishError> {
        self.sender
            .try_send(PublishedMessage {
                message: message.clone(),
                status: status.to_string(),
            })
            .map_err(|err| PublishError::DeliveryFailed(err.to_string()))
    }
}

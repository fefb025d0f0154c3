use thiserror::Error;

use crate::message::Message;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
    #[error("log write failed: {0}")]
    WriteFailed(String),
    #[error("message encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Hands finished messages to a transport.
pub trait Publisher: Send + Sync {
    fn publish(&self, message: &Message, status: &str) -> Result<(), PublishError>;
}

/// A message together with the status label it was published under.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub message: Message,
    pub status: String,
}

pub mod callback;
pub mod channel;
pub mod log;

pub use callback::CallbackPublisher;
pub use channel::ChannelPublisher;
pub use log::LogPublisher;

use std::sync::Arc;

use crate::message::Message;
use crate::publisher::{PublishError, Publisher};

type CallbackHandler = dyn Fn(&Message, &str) -> Result<(), PublishError> + Send + Sync;

/// Publishes by calling a user-supplied function.
#[derive(Clone)]
pub struct CallbackPublisher {
    handler: Arc<CallbackHandler>,
}

impl CallbackPublisher {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Message, &str) -> Result<(), PublishError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl Publisher for CallbackPublisher {
    fn publish(&self, message: &Message, status: &str) -> Result<(), PublishError> {
        (self.handler)(message, status)
    }
}

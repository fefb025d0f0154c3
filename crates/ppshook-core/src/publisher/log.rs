use std::io::Write;
use std::sync::Mutex;

use chrono::Utc;

use crate::message::Message;
use crate::publisher::{PublishError, Publisher};

/// Writes each message in posttroll wire form, one per line.
pub struct LogPublisher<W: Write + Send> {
    writer: Mutex<W>,
    sender: String,
}

impl<W: Write + Send> LogPublisher<W> {
    pub fn new(writer: W) -> Self {
        Self::with_sender(writer, "pps-hook")
    }

    pub fn with_sender(writer: W, sender: impl Into<String>) -> Self {
        Self {
            writer: Mutex::new(writer),
            sender: sender.into(),
        }
    }

    pub fn into_inner(self) -> Result<W, PublishError> {
        self.writer
            .into_inner()
            .map_err(|_| PublishError::WriteFailed("log writer mutex poisoned".to_string()))
    }
}

impl<W: Write + Send> Publisher for LogPublisher<W> {
    fn publish(&self, message: &Message, _status: &str) -> Result<(), PublishError> {
        let line = message.encode(&self.sender, Utc::now().naive_utc())?;
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| PublishError::WriteFailed("log writer mutex poisoned".to_string()))?;
        writeln!(guard, "{line}").map_err(|err| PublishError::WriteFailed(err.to_string()))?;
        guard
            .flush()
            .map_err(|err| PublishError::WriteFailed(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Content;
    use serde_json::json;

    #[test]
    fn writes_one_encoded_line_per_message() {
        let publisher = LogPublisher::with_sender(Vec::new(), "pps@host");
        let mut content = Content::new();
        content.insert("uid".into(), json!("xxx"));
        let message = Message::file("/CF/2/UNKNOWN/norrkoping/offline/polar/direct_readout/", content);

        publisher.publish(&message, "OK").expect("publish");
        publisher.publish(&message, "OK").expect("publish");

        let written = String::from_utf8(publisher.into_inner().expect("writer")).expect("utf8");
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("pytroll://CF/2/UNKNOWN/norrkoping/"));
        assert!(lines[0].contains(" file pps@host "));
        assert!(lines[0].ends_with("v1.01 application/json {\"uid\":\"xxx\"}"));
    }
}

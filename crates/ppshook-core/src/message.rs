use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MESSAGE_TYPE_FILE: &str = "file";

const POSTTROLL_MAGIC: &str = "pytroll:/";
const POSTTROLL_VERSION: &str = "v1.01";
const POSTTROLL_MIME: &str = "application/json";

/// Message content, keyed by field name.
pub type Content = Map<String, Value>;

/// A finished notification: topic header, message type and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub header: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub content: Content,
}

impl Message {
    pub fn file(header: impl Into<String>, content: Content) -> Self {
        Self {
            header: header.into(),
            message_type: MESSAGE_TYPE_FILE.to_string(),
            content,
        }
    }

    pub fn content_str(&self, key: &str) -> Option<&str> {
        self.content.get(key).and_then(Value::as_str)
    }

    /// Renders the posttroll wire form:
    /// `pytroll:/<header> <type> <sender> <time> v1.01 application/json <content>`.
    pub fn encode(&self, sender: &str, sent_at: NaiveDateTime) -> Result<String, serde_json::Error> {
        let body = serde_json::to_string(&self.content)?;
        Ok(format!(
            "{POSTTROLL_MAGIC}{} {} {} {} {POSTTROLL_VERSION} {POSTTROLL_MIME} {body}",
            self.header,
            self.message_type,
            sender,
            sent_at.format("%Y-%m-%dT%H:%M:%S%.6f"),
        ))
    }
}

// crates/ppshook-core/src/builder.rs

use std::path::Path;
use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;
use tracing::{debug, info};

use crate::checks::{
    check_metadata_contains_mandatory_parameters, default_checks, run_checks, MetadataCheck,
};
use crate::error::{HookError, Result};
use crate::host::{HostResolver, SystemHost};
use crate::message::{Content, Message};
use crate::metadata::{MetadataRecord, MANDATORY_FIELDS};
use crate::platform::normalize_platform_name;
use crate::publisher::Publisher;
use crate::segment::{SegmentClassifier, ViirsGranuleClassifier};
use crate::status::Status;

const UNKNOWN_PLATFORM: &str = "UNKNOWN";
const HEADER_SUFFIX: &str = "offline/polar/direct_readout/";

/// Builds the notification for one processed granule.
///
/// Validation runs in the constructor, so a `MessageBuilder` that exists
/// holds metadata good enough to build from. Each instance is tied to one
/// record and never mutated after construction.
pub struct MessageBuilder {
    status: Status,
    metadata: MetadataRecord,
    host: Arc<dyn HostResolver>,
    segments: Arc<dyn SegmentClassifier>,
    header_platform: Option<String>,
}

impl MessageBuilder {
    /// Validates `metadata` with the mandatory-parameter and filename checks.
    pub fn new(status: impl Into<Status>, metadata: MetadataRecord) -> Result<Self> {
        Self::with_checks(status, metadata, &default_checks())
    }

    /// Validates `metadata` with the given checks only.
    pub fn with_checks(
        status: impl Into<Status>,
        metadata: MetadataRecord,
        checks: &[&dyn MetadataCheck],
    ) -> Result<Self> {
        let status = status.into();
        run_checks(checks, status, &metadata)?;
        Ok(Self {
            status,
            metadata,
            host: Arc::new(SystemHost),
            segments: Arc::new(ViirsGranuleClassifier::default()),
            header_platform: None,
        })
    }

    pub fn with_host_resolver(mut self, host: Arc<dyn HostResolver>) -> Self {
        self.host = host;
        self
    }

    pub fn with_segment_classifier(mut self, segments: Arc<dyn SegmentClassifier>) -> Self {
        self.segments = segments;
        self
    }

    /// Platform written into the header; `UNKNOWN` when not set.
    pub fn with_header_platform(mut self, platform: Option<String>) -> Self {
        self.header_platform = platform;
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn metadata(&self) -> &MetadataRecord {
        &self.metadata
    }

    /// Re-checks the mandatory parameters on the current metadata.
    pub fn check_mandatory_fields(&self) -> Result<()> {
        check_metadata_contains_mandatory_parameters(&self.metadata)
    }

    /// Builds and publishes the message for a successful run. Failed runs
    /// publish nothing.
    pub fn send(&self, publisher: &dyn Publisher) -> Result<Option<Message>> {
        if !self.status.is_success() {
            debug!(status = self.status.code(), "Run failed, no message sent");
            return Ok(None);
        }

        let label = self.status.label();
        let message = self.create_message(label)?;
        publisher.publish(&message, label)?;
        info!(
            header = %message.header,
            uid = message.content_str("uid").unwrap_or_default(),
            "Published message"
        );
        Ok(Some(message))
    }

    pub fn create_message(&self, status_label: &str) -> Result<Message> {
        let segment = self.is_segment()?;

        let mut content = self.create_message_content_from_metadata();
        content.extend(self.get_message_with_uri_and_uid());
        content.insert("status".to_string(), Value::String(status_label.to_string()));

        let header = self.create_header(&content, segment);
        Ok(Message::file(header, content))
    }

    pub fn is_segment(&self) -> Result<bool> {
        self.segments.is_segment(self)
    }

    fn create_header(&self, content: &Content, segment: bool) -> String {
        let field = |key: &str| content.get(key).and_then(Value::as_str).unwrap_or_default();
        let platform = self.header_platform.as_deref().unwrap_or(UNKNOWN_PLATFORM);
        let prefix = if segment { "/segment" } else { "" };

        format!(
            "{prefix}/{}/{}/{platform}/{}/{HEADER_SUFFIX}",
            field("format"),
            field("data_processing_level"),
            field("station"),
        )
    }

    pub fn create_message_content_from_metadata(&self) -> Content {
        let mut content = self.metadata.to_content();
        if let Some(platform) = &self.metadata.platform_name {
            content.insert(
                "platform_name".to_string(),
                Value::String(normalize_platform_name(platform)),
            );
        }
        fix_mandatory_fields_in_message(&mut content, &self.metadata);
        clean_unused_keys_in_message(&mut content);
        content
    }

    /// `uri` and `uid` of the produced file, or an empty mapping when the
    /// metadata names no file.
    pub fn get_message_with_uri_and_uid(&self) -> Content {
        let mut content = Content::new();
        let Some(filename) = &self.metadata.filename else {
            return content;
        };

        let uid = Path::new(filename)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        content.insert(
            "uri".to_string(),
            Value::String(format!("ssh://{}{}", self.host.hostname(), filename)),
        );
        content.insert("uid".to_string(), Value::String(uid));
        content
    }

    pub fn get_granule_duration(&self) -> Result<Duration> {
        let start = self
            .metadata
            .start_time
            .ok_or(HookError::InvalidDuration { missing: "start_time" })?;
        let end = self
            .metadata
            .end_time
            .ok_or(HookError::InvalidDuration { missing: "end_time" })?;
        Ok(end - start)
    }

    pub fn sensor_is_viirs(&self) -> bool {
        self.metadata.sensor.as_deref() == Some("viirs")
    }
}

/// Copies each mandatory configuration value into its message key. Keys
/// already in `content` are kept.
pub fn fix_mandatory_fields_in_message(content: &mut Content, metadata: &MetadataRecord) {
    for (key, message_key) in MANDATORY_FIELDS {
        if let Some(value) = metadata.mandatory_value(key) {
            content.insert(message_key.to_string(), Value::String(value.to_string()));
        }
    }
}

/// Drops the configuration-only names of renamed mandatory fields.
pub fn clean_unused_keys_in_message(content: &mut Content) {
    for (key, message_key) in MANDATORY_FIELDS {
        if key != message_key {
            content.remove(key);
        }
    }
}

// crates/ppshook-core/src/config.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::builder::MessageBuilder;
use crate::checks::check_metadata_contains_mandatory_parameters;
use crate::error::Result;
use crate::message::Message;
use crate::metadata::MetadataRecord;
use crate::publisher::Publisher;
use crate::segment::ViirsGranuleClassifier;
use crate::status::Status;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid hook configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("configuration has no `{0}` section")]
    MissingSection(&'static str),
    #[error("segment_max_duration_seconds must be positive, got {0}")]
    InvalidSegmentDuration(i64),
}

// Plain deserialization targets. Nothing here is executable; `HookConfig`
// is assembled from these in a second step.

#[derive(Debug, Deserialize)]
pub struct RawHookConfig {
    pub pps_hook: Option<RawHookSection>,
}

#[derive(Debug, Deserialize)]
pub struct RawHookSection {
    #[serde(default)]
    pub post_hook: Option<RawPostHook>,
}

#[derive(Debug, Deserialize)]
pub struct RawPostHook {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: MetadataRecord,
    #[serde(default)]
    pub header_platform: Option<String>,
    #[serde(default)]
    pub segment_max_duration_seconds: Option<i64>,
}

/// Loaded hook configuration.
#[derive(Debug, Clone)]
pub struct HookConfig {
    post_hook: Option<MessageSpec>,
}

impl HookConfig {
    pub fn from_raw(raw: RawHookConfig) -> std::result::Result<Self, ConfigError> {
        let section = raw.pps_hook.ok_or(ConfigError::MissingSection("pps_hook"))?;
        let post_hook = section.post_hook.map(MessageSpec::from_raw).transpose()?;
        Ok(Self { post_hook })
    }

    /// The configured post hook, if any. Without one nothing is published.
    pub fn post_hook(&self) -> Option<&MessageSpec> {
        self.post_hook.as_ref()
    }
}

/// Static message settings applied to every granule.
#[derive(Debug, Clone)]
pub struct MessageSpec {
    pub description: Option<String>,
    pub metadata: MetadataRecord,
    pub header_platform: Option<String>,
    pub segment_max_duration: Duration,
}

impl MessageSpec {
    pub fn new(metadata: MetadataRecord) -> Self {
        Self {
            description: None,
            metadata,
            header_platform: None,
            segment_max_duration: ViirsGranuleClassifier::default().max_duration,
        }
    }

    pub fn from_raw(raw: RawPostHook) -> std::result::Result<Self, ConfigError> {
        let segment_max_duration = match raw.segment_max_duration_seconds {
            Some(seconds) if seconds <= 0 => {
                return Err(ConfigError::InvalidSegmentDuration(seconds));
            }
            Some(seconds) => Duration::seconds(seconds),
            None => ViirsGranuleClassifier::default().max_duration,
        };

        Ok(Self {
            description: raw.description,
            metadata: raw.metadata,
            header_platform: raw.header_platform,
            segment_max_duration,
        })
    }

    /// Missing mandatory keys are tolerated at load time; this surfaces them
    /// without building a message.
    pub fn check_mandatory_fields(&self) -> Result<()> {
        check_metadata_contains_mandatory_parameters(&self.metadata)
    }

    /// Granule metadata with the configured values laid over it.
    pub fn merged_metadata(&self, granule: &MetadataRecord) -> MetadataRecord {
        let mut merged = granule.clone();
        merged.merge(&self.metadata);
        merged
    }

    pub fn builder(&self, status: Status, granule: &MetadataRecord) -> Result<MessageBuilder> {
        let builder = MessageBuilder::new(status, self.merged_metadata(granule))?
            .with_segment_classifier(Arc::new(ViirsGranuleClassifier::new(
                self.segment_max_duration,
            )))
            .with_header_platform(self.header_platform.clone());
        Ok(builder)
    }

    /// Builds and publishes the message for one granule. Returns `None`
    /// when the run failed and nothing was sent.
    pub fn post_hook(
        &self,
        status: impl Into<Status>,
        granule: &MetadataRecord,
        publisher: &dyn Publisher,
    ) -> Result<Option<Message>> {
        let status = status.into();
        debug!(status = status.code(), "Post hook called");
        self.builder(status, granule)?.send(publisher)
    }
}

pub fn parse_config(contents: &str) -> std::result::Result<HookConfig, ConfigError> {
    let raw: RawHookConfig = serde_yaml::from_str(contents)?;
    HookConfig::from_raw(raw)
}

pub fn load_config(path: impl AsRef<Path>) -> std::result::Result<HookConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents)
}

pub mod builder;
pub mod checks;
pub mod config;
pub mod error;
pub mod host;
pub mod message;
pub mod metadata;
pub mod platform;
pub mod publisher;
pub mod runner;
pub mod segment;
pub mod status;

pub use builder::MessageBuilder;
pub use checks::{default_checks, FilenamePresent, MandatoryParameters, MetadataCheck};
pub use config::{load_config, parse_config, ConfigError, HookConfig, MessageSpec};
pub use error::{HookError, Result};
pub use host::{FixedHost, HostResolver, SystemHost};
pub use message::{Content, Message, MESSAGE_TYPE_FILE};
pub use metadata::{MetadataRecord, MANDATORY_FIELDS};
pub use platform::normalize_platform_name;
pub use publisher::{
    CallbackPublisher, ChannelPublisher, LogPublisher, PublishError, PublishedMessage, Publisher,
};
pub use runner::{process_events, read_events, GranuleEvent, GranuleFailure, RunSummary};
pub use segment::{FixedSegment, SegmentClassifier, ViirsGranuleClassifier};
pub use status::Status;

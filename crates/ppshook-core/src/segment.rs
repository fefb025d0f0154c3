use chrono::Duration;

use crate::builder::MessageBuilder;
use crate::error::Result;

/// Decides whether a granule is a segment of a longer pass.
pub trait SegmentClassifier: Send + Sync {
    fn is_segment(&self, builder: &MessageBuilder) -> Result<bool>;
}

/// VIIRS granules shorter than `max_duration` are segments; any other
/// sensor is treated as a full pass and its timestamps are never read.
#[derive(Debug, Clone, Copy)]
pub struct ViirsGranuleClassifier {
    pub max_duration: Duration,
}

impl ViirsGranuleClassifier {
    pub const DEFAULT_MAX_DURATION_SECONDS: i64 = 600;

    pub fn new(max_duration: Duration) -> Self {
        Self { max_duration }
    }
}

impl Default for ViirsGranuleClassifier {
    fn default() -> Self {
        Self::new(Duration::seconds(Self::DEFAULT_MAX_DURATION_SECONDS))
    }
}

impl SegmentClassifier for ViirsGranuleClassifier {
    fn is_segment(&self, builder: &MessageBuilder) -> Result<bool> {
        if !builder.sensor_is_viirs() {
            return Ok(false);
        }
        let duration = builder.get_granule_duration()?;
        Ok(duration < self.max_duration)
    }
}

/// Always answers the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSegment(pub bool);

impl SegmentClassifier for FixedSegment {
    fn is_segment(&self, _builder: &MessageBuilder) -> Result<bool> {
        Ok(self.0)
    }
}

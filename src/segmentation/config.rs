use chrono::Duration;

use crate::timeline::CLIP_DURATION_SECS;

/// Tunables for grouping clips into activity segments.
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// How long each clip is assumed to run after its start stamp
    pub clip_duration_secs: i64,

    /// Gap between one clip's end and the next clip's start that still
    /// counts as continuous recording
    pub gap_tolerance_ms: i64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            clip_duration_secs: CLIP_DURATION_SECS,
            gap_tolerance_ms: 1_000,
        }
    }
}

impl SegmentationConfig {
    pub fn clip_duration(&self) -> Duration {
        Duration::seconds(self.clip_duration_secs)
    }

    pub fn gap_tolerance(&self) -> Duration {
        Duration::milliseconds(self.gap_tolerance_ms)
    }
}

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::timeline::{ClipFile, ClipTimestamp, DateRange};

pub const WINDOW_RANGE_NAME: &str = "windowRange";

/// Everything the view needs to draw the date line and the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowState {
    pub filter_range: DateRange,
    /// Always inside `filter_range`.
    pub window_range: DateRange,
    /// Start of the clip being played; inside `filter_range` whenever the
    /// filtered clip list is non-empty.
    pub playhead: Option<ClipTimestamp>,
}

impl WindowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.playhead.is_none()
    }

    /// `window ⊆ filter` and `playhead ∈ filter`.
    pub fn is_consistent(&self) -> bool {
        let Some((filter_start, filter_end)) = self.filter_range.bounds() else {
            return self.window_range == DateRange::Empty && self.playhead.is_none();
        };
        let window_ok = match self.window_range.bounds() {
            None => true,
            Some((start, end)) => filter_start <= start && end <= filter_end,
        };
        let playhead_ok = self
            .playhead
            .map(|at| self.filter_range.contains(at))
            .unwrap_or(true);
        window_ok && playhead_ok
    }
}

/// Index of the oldest clip starting at or after `at`, in a newest-first
/// list. Falls back to the newest clip when `at` is past every clip.
pub fn nearest_clip_index(clips: &[ClipFile], at: ClipTimestamp) -> Option<usize> {
    if clips.is_empty() {
        return None;
    }
    let at_or_after = clips.partition_point(|clip| clip.start >= at);
    Some(at_or_after.saturating_sub(1))
}

/// Fit a window of `duration` into `filter`, shifting rather than shrinking
/// unless the filter itself is shorter.
pub fn clamp_into(filter: &DateRange, start: ClipTimestamp, duration: Duration) -> DateRange {
    let Some((filter_start, filter_end)) = filter.bounds() else {
        return DateRange::Empty;
    };
    let duration = duration.min(filter_end - filter_start).max(Duration::zero());
    let mut start = start;
    if start < filter_start {
        start = filter_start;
    }
    if start + duration > filter_end {
        start = filter_end - duration;
    }
    DateRange::new(WINDOW_RANGE_NAME, start, start + duration)
}

/// Window to show once the playhead moves to `at`: unchanged if `at` is
/// strictly inside, otherwise centred on `at` and clamped into `filter`.
pub fn recenter(window: &DateRange, filter: &DateRange, at: ClipTimestamp) -> DateRange {
    if let Some((start, end)) = window.bounds() {
        if start < at && at < end {
            return window.clone();
        }
    }
    let duration = window.duration();
    let half = Duration::milliseconds(duration.num_milliseconds() / 2);
    clamp_into(filter, at - half, duration)
}

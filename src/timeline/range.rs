use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::clock::{parse_filename_date, ClipFile, ClipTimestamp};
use crate::error::TimelineResult;

pub const NO_FILES_NAME: &str = "No Files";

/// A named, closed span of wall-clock time.
///
/// `Empty` stands in for "there is nothing to show" (no files, or nothing
/// selected yet) and compares structurally like any other value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DateRange {
    Empty,
    #[serde(rename_all = "camelCase")]
    Range {
        name: String,
        start: ClipTimestamp,
        end: ClipTimestamp,
    },
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::Empty
    }
}

impl DateRange {
    /// Builds a range, swapping the bounds if they were handed in reversed.
    pub fn new(name: impl Into<String>, start: ClipTimestamp, end: ClipTimestamp) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        DateRange::Range {
            name: name.into(),
            start,
            end,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DateRange::Empty => NO_FILES_NAME,
            DateRange::Range { name, .. } => name,
        }
    }

    pub fn bounds(&self) -> Option<(ClipTimestamp, ClipTimestamp)> {
        match self {
            DateRange::Empty => None,
            DateRange::Range { start, end, .. } => Some((*start, *end)),
        }
    }

    pub fn start(&self) -> Option<ClipTimestamp> {
        self.bounds().map(|(start, _)| start)
    }

    pub fn end(&self) -> Option<ClipTimestamp> {
        self.bounds().map(|(_, end)| end)
    }

    pub fn duration(&self) -> Duration {
        self.bounds()
            .map(|(start, end)| end - start)
            .unwrap_or_else(Duration::zero)
    }

    /// True for the sentinel and for zero-length ranges.
    pub fn is_empty(&self) -> bool {
        match self.bounds() {
            None => true,
            Some((start, end)) => start == end,
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, at: ClipTimestamp) -> bool {
        self.bounds()
            .map(|(start, end)| start <= at && at <= end)
            .unwrap_or(false)
    }

    /// Inclusive overlap with `[lo, hi]`.
    pub fn overlaps(&self, lo: ClipTimestamp, hi: ClipTimestamp) -> bool {
        self.bounds()
            .map(|(start, end)| end >= lo && start <= hi)
            .unwrap_or(false)
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        match self {
            DateRange::Empty => DateRange::Empty,
            DateRange::Range { start, end, .. } => DateRange::new(name, *start, *end),
        }
    }

    /// Clips starting in `[start, end]`, keeping the newest-first order.
    pub fn filter_clips(&self, clips: &[ClipFile]) -> Vec<ClipFile> {
        let Some((start, end)) = self.bounds() else {
            return Vec::new();
        };
        clips
            .iter()
            .take_while(|clip| clip.start >= start)
            .filter(|clip| clip.start <= end)
            .cloned()
            .collect()
    }

    /// Filenames starting in `[start, end]`. Input must be newest-first; the
    /// scan stops at the first clip older than `start`.
    pub fn filter_file_names<S: AsRef<str>>(&self, filenames: &[S]) -> TimelineResult<Vec<String>> {
        let Some((start, end)) = self.bounds() else {
            return Ok(Vec::new());
        };
        let mut filtered = Vec::new();
        for name in filenames {
            let name = name.as_ref();
            let at = parse_filename_date(name)?;
            if at < start {
                break;
            }
            if at <= end {
                filtered.push(name.to_string());
            }
        }
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::clock::parse_all;

    fn ts(name: &str) -> ClipTimestamp {
        parse_filename_date(name).unwrap()
    }

    #[test]
    fn test_empty_sentinel_is_structural() {
        let a = DateRange::Empty;
        let b = DateRange::default();
        assert_eq!(a, b);
        assert!(a.is_empty());
        assert_eq!(a.duration(), Duration::zero());
        assert_eq!(a.name(), NO_FILES_NAME);
        assert!(!a.contains(ts("20250101-000000")));
    }

    #[test]
    fn test_new_orders_bounds() {
        let range = DateRange::new("r", ts("20250102-000000"), ts("20250101-000000"));
        assert_eq!(range.start(), Some(ts("20250101-000000")));
        assert_eq!(range.duration(), Duration::days(1));
    }

    #[test]
    fn test_equality_by_value() {
        let a = DateRange::new("All time", ts("20250101-000000"), ts("20250102-000000"));
        let b = DateRange::new("All time", ts("20250101-000000"), ts("20250102-000000"));
        assert_eq!(a, b);
        assert_ne!(a, a.with_name("Last 7 days"));
    }

    #[test]
    fn test_filter_file_names_inclusive() {
        let files = [
            "20250101-000300",
            "20250101-000200",
            "20250101-000100",
            "20250101-000000",
        ];
        let range = DateRange::new("r", ts("20250101-000100"), ts("20250101-000300"));
        assert_eq!(
            range.filter_file_names(&files).unwrap(),
            vec!["20250101-000300", "20250101-000200", "20250101-000100"]
        );

        let clips = parse_all(&files).unwrap();
        let filtered = range.filter_clips(&clips);
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered[2].name, "20250101-000100");
    }

    #[test]
    fn test_overlaps_inclusive() {
        let range = DateRange::new("r", ts("20250101-000000"), ts("20250101-010000"));
        assert!(range.overlaps(ts("20250101-010000"), ts("20250101-020000")));
        assert!(!range.overlaps(ts("20250101-010001"), ts("20250101-020000")));
        assert!(!DateRange::Empty.overlaps(ts("20250101-000000"), ts("20250101-020000")));
    }
}

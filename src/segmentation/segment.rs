use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::timeline::{ClipTimestamp, DateRange};

/// A run of clips with no gap wider than the configured tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySegment {
    pub range: DateRange,
    pub clip_count: usize,
}

impl ActivitySegment {
    pub fn new(
        label: impl Into<String>,
        start: ClipTimestamp,
        end: ClipTimestamp,
        clip_count: usize,
    ) -> Self {
        Self {
            range: DateRange::new(label, start, end),
            clip_count,
        }
    }

    pub fn label(&self) -> &str {
        self.range.name()
    }

    pub fn start(&self) -> ClipTimestamp {
        // Segments are always built from concrete bounds.
        self.range.start().unwrap_or_default()
    }

    pub fn end(&self) -> ClipTimestamp {
        self.range.end().unwrap_or_default()
    }

    pub fn duration(&self) -> Duration {
        self.range.duration()
    }

    /// Where this segment sits along `axis`, as fractions of the axis
    /// duration. `None` for an empty or zero-length axis.
    pub fn axis_fraction(&self, axis: &DateRange) -> Option<AxisSpan> {
        let (axis_start, _) = axis.bounds()?;
        let axis_ms = axis.duration().num_milliseconds();
        if axis_ms <= 0 {
            return None;
        }
        let offset = (self.start() - axis_start).num_milliseconds() as f64 / axis_ms as f64;
        let length = self.duration().num_milliseconds() as f64 / axis_ms as f64;
        Some(AxisSpan { offset, length })
    }
}

/// Activity marker geometry on a date line: both fields are fractions of
/// the axis, `offset` measured from the axis start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisSpan {
    pub offset: f64,
    pub length: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::parse_filename_date;

    fn ts(name: &str) -> ClipTimestamp {
        parse_filename_date(name).unwrap()
    }

    #[test]
    fn test_axis_fraction() {
        let axis = DateRange::new("axis", ts("20250101-000000"), ts("20250101-000400"));

        let first = ActivitySegment::new("a", ts("20250101-000000"), ts("20250101-000040"), 4);
        let span = first.axis_fraction(&axis).unwrap();
        assert_eq!(span.offset, 0.0);
        assert!((span.length - 40.0 / 240.0).abs() < 1e-9);

        let middle = ActivitySegment::new("b", ts("20250101-000200"), ts("20250101-000220"), 2);
        let span = middle.axis_fraction(&axis).unwrap();
        assert!((span.offset - 0.5).abs() < 1e-9);
        assert!((span.length - 20.0 / 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_axis_fraction_needs_a_real_axis() {
        let segment = ActivitySegment::new("a", ts("20250101-000000"), ts("20250101-000010"), 1);
        assert_eq!(segment.axis_fraction(&DateRange::Empty), None);
        let point = DateRange::new("p", ts("20250101-000000"), ts("20250101-000000"));
        assert_eq!(segment.axis_fraction(&point), None);
    }
}

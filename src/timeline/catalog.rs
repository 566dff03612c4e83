use chrono::Duration;

use super::clock::{parse_filename_date, ClipTimestamp};
use super::range::DateRange;
use crate::error::{TimelineError, TimelineResult};

pub const ALL_TIME_NAME: &str = "All time";

/// Lookback ladder in hours, shortest first.
const LOOKBACK_HOURS: [i64; 8] = [1, 6, 12, 24, 24 * 7, 24 * 30, 24 * 90, 24 * 365];

fn lookback_name(hours: i64) -> String {
    match hours {
        24 => "Last 24 hours".to_string(),
        h if h < 24 => format!("Last {h} hours"),
        h => format!("Last {} days", h / 24),
    }
}

/// Selectable filter ranges for a newest-first file list, tightest first.
///
/// A lookback is offered only when it starts at or after the oldest clip;
/// anything wider would show the same clips as "All time", which is always
/// appended last and spans exactly oldest to newest clip.
pub fn valid_ranges<S: AsRef<str>>(
    filenames: &[S],
    now: ClipTimestamp,
) -> TimelineResult<Vec<DateRange>> {
    let (Some(first), Some(last)) = (filenames.first(), filenames.last()) else {
        return Ok(vec![DateRange::Empty]);
    };
    let latest = parse_filename_date(first.as_ref())?;
    let earliest = parse_filename_date(last.as_ref())?;

    let mut ranges: Vec<DateRange> = LOOKBACK_HOURS
        .iter()
        .filter_map(|&hours| {
            let start = now - Duration::hours(hours);
            (start >= earliest).then(|| DateRange::new(lookback_name(hours), start, now))
        })
        .collect();
    ranges.push(DateRange::new(ALL_TIME_NAME, earliest, latest));

    log::debug!(
        "{} ranges available for {} files ({} .. {})",
        ranges.len(),
        filenames.len(),
        earliest,
        latest
    );
    Ok(ranges)
}

pub fn find_range<'a>(ranges: &'a [DateRange], name: &str) -> TimelineResult<&'a DateRange> {
    ranges
        .iter()
        .find(|range| range.name() == name)
        .ok_or_else(|| TimelineError::UnknownRange(name.to_string()))
}

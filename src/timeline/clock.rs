use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

/// Wall-clock capture time of a clip. Filenames carry no zone, so all
/// timeline arithmetic stays in naive local time.
pub type ClipTimestamp = NaiveDateTime;

/// Every clip is assumed to cover this many seconds after its start.
pub const CLIP_DURATION_SECS: i64 = 10;

/// `YYYYMMDD-HHMMSS`
pub const FILENAME_STAMP_LEN: usize = 15;

pub fn clip_duration() -> Duration {
    Duration::seconds(CLIP_DURATION_SECS)
}

/// A clip base filename paired with its parsed start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipFile {
    pub name: String,
    pub start: ClipTimestamp,
}

impl ClipFile {
    pub fn parse(name: &str) -> TimelineResult<Self> {
        Ok(Self {
            name: name.to_string(),
            start: parse_filename_date(name)?,
        })
    }

    pub fn end(&self, clip_duration: Duration) -> ClipTimestamp {
        self.start + clip_duration
    }
}

/// Parse every filename, failing on the first malformed entry.
pub fn parse_all<S: AsRef<str>>(filenames: &[S]) -> TimelineResult<Vec<ClipFile>> {
    filenames
        .iter()
        .map(|name| ClipFile::parse(name.as_ref()))
        .collect()
}

/// Parse the fixed-width `YYYYMMDD-HHMMSS` prefix of a clip base filename.
///
/// Anything after the stamp (an extension, a suffix) is ignored. The caller
/// is expected to hand in names from the recorder; this does not scan for
/// the stamp elsewhere in the string.
pub fn parse_filename_date(filename: &str) -> TimelineResult<ClipTimestamp> {
    let field = |from: usize, to: usize, what: &str| -> TimelineResult<u32> {
        let raw = filename
            .get(from..to)
            .ok_or_else(|| TimelineError::malformed(filename, format!("missing {what}")))?;
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimelineError::malformed(
                filename,
                format!("{what} '{raw}' is not numeric"),
            ));
        }
        raw.parse::<u32>()
            .map_err(|err| TimelineError::malformed(filename, format!("{what}: {err}")))
    };

    let year = field(0, 4, "year")?;
    let month = field(4, 6, "month")?;
    let day = field(6, 8, "day")?;
    if filename.as_bytes().get(8) != Some(&b'-') {
        return Err(TimelineError::malformed(filename, "missing '-' separator"));
    }
    let hour = field(9, 11, "hour")?;
    let minute = field(11, 13, "minute")?;
    let second = field(13, 15, "second")?;

    let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(|| {
        TimelineError::malformed(filename, format!("no such date {year:04}-{month:02}-{day:02}"))
    })?;
    date.and_hms_opt(hour, minute, second).ok_or_else(|| {
        TimelineError::malformed(
            filename,
            format!("no such time {hour:02}:{minute:02}:{second:02}"),
        )
    })
}

pub fn format_filename_date(timestamp: &ClipTimestamp) -> String {
    timestamp.format("%Y%m%d-%H%M%S").to_string()
}

pub fn now_local() -> ClipTimestamp {
    Local::now().naive_local()
}

/// Milliseconds since the Unix epoch for a local wall-clock time.
pub fn to_epoch_ms(timestamp: &ClipTimestamp) -> i64 {
    Local
        .from_local_datetime(timestamp)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        // Wall-clock times skipped by a DST jump have no local instant.
        .unwrap_or_else(|| timestamp.and_utc().timestamp_millis())
}

pub fn from_epoch_ms(ms: i64) -> Option<ClipTimestamp> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.with_timezone(&Local).naive_local())
}

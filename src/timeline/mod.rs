pub mod catalog;
pub mod clock;
pub mod range;

pub use catalog::{find_range, valid_ranges, ALL_TIME_NAME};
pub use clock::{
    clip_duration, format_filename_date, now_local, parse_all, parse_filename_date, ClipFile,
    ClipTimestamp, CLIP_DURATION_SECS,
};
pub use range::{DateRange, NO_FILES_NAME};

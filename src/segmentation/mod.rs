pub mod algorithm;
pub mod config;
pub mod segment;

pub use algorithm::{contiguous_ranges, group_clips};
pub use config::SegmentationConfig;
pub use segment::{ActivitySegment, AxisSpan};

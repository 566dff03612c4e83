use crate::error::TimelineResult;
use crate::segmentation::config::SegmentationConfig;
use crate::segmentation::segment::ActivitySegment;
use crate::timeline::{parse_all, ClipFile, ClipTimestamp};

/// Clips being accumulated into one segment.
#[derive(Debug, Clone)]
struct ClipRun {
    start: ClipTimestamp,
    end: ClipTimestamp,
    clip_count: usize,
}

impl ClipRun {
    fn into_segment(self) -> ActivitySegment {
        let label = format!(
            "{} - {}",
            self.start.format("%-m/%-d/%Y"),
            self.end.format("%-m/%-d/%Y")
        );
        ActivitySegment::new(label, self.start, self.end, self.clip_count)
    }
}

/// Merge clip start times into contiguous recording segments.
///
/// `filenames` are newest-first as served by the recorder; the result is
/// oldest-first.
pub fn contiguous_ranges<S: AsRef<str>>(
    filenames: &[S],
    config: &SegmentationConfig,
) -> TimelineResult<Vec<ActivitySegment>> {
    let clips = parse_all(filenames)?;
    Ok(group_clips(&clips, config))
}

/// Same as [`contiguous_ranges`] over already parsed, newest-first clips.
pub fn group_clips(clips: &[ClipFile], config: &SegmentationConfig) -> Vec<ActivitySegment> {
    let clip_duration = config.clip_duration();

    // Edge case: a lone clip keeps its filename as the label
    if let [only] = clips {
        return vec![ActivitySegment::new(
            only.name.clone(),
            only.start,
            only.end(clip_duration),
            1,
        )];
    }

    let mut segments = Vec::new();
    let mut current: Option<ClipRun> = None;

    for clip in clips.iter().rev() {
        match &mut current {
            Some(run) if clip.start - run.end <= config.gap_tolerance() => {
                run.end = run.end.max(clip.end(clip_duration));
                run.clip_count += 1;
            }
            _ => {
                if let Some(run) = current.take() {
                    segments.push(run.into_segment());
                }
                current = Some(ClipRun {
                    start: clip.start,
                    end: clip.end(clip_duration),
                    clip_count: 1,
                });
            }
        }
    }

    if let Some(run) = current {
        segments.push(run.into_segment());
    }

    segments
}

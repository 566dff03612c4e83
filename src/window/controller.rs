use chrono::Duration;
use log::debug;

use super::config::WindowConfig;
use super::state::{clamp_into, nearest_clip_index, recenter, WindowState, WINDOW_RANGE_NAME};
use crate::error::TimelineResult;
use crate::timeline::{parse_all, ClipFile, ClipTimestamp, DateRange};

/// Receives state changes from a [`WindowController`]. Both callbacks fire
/// only when the value actually changed.
pub trait WindowListener: Send {
    fn on_window_changed(&mut self, _window: &DateRange) {}

    fn on_playhead_changed(&mut self, _playhead: Option<ClipTimestamp>) {}
}

/// Owns the filter range, scrub window and playhead for one viewer.
///
/// Every mutating call returns the complete new [`WindowState`]. When the
/// filtered clip list is empty, gestures leave the state untouched.
pub struct WindowController {
    config: WindowConfig,
    /// Newest-first, as served.
    clips: Vec<ClipFile>,
    /// `clips` restricted to the filter range.
    filtered: Vec<ClipFile>,
    state: WindowState,
    listeners: Vec<Box<dyn WindowListener>>,
}

impl Default for WindowController {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

impl WindowController {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            clips: Vec::new(),
            filtered: Vec::new(),
            state: WindowState::new(),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn WindowListener>) {
        self.listeners.push(listener);
    }

    pub fn state(&self) -> &WindowState {
        &self.state
    }

    pub fn clips(&self) -> &[ClipFile] {
        &self.clips
    }

    pub fn filtered_clips(&self) -> &[ClipFile] {
        &self.filtered
    }

    /// Filtered clips that start inside the window, newest first.
    pub fn window_clips(&self) -> Vec<ClipFile> {
        self.state.window_range.filter_clips(&self.filtered)
    }

    pub fn playhead_index(&self) -> Option<usize> {
        nearest_clip_index(&self.filtered, self.state.playhead?)
    }

    pub fn current_clip(&self) -> Option<&ClipFile> {
        self.playhead_index().and_then(|index| self.filtered.get(index))
    }

    /// Replace the whole file list. The current filter range is re-applied
    /// from scratch; nothing from the previous list is carried over.
    pub fn set_file_list<S: AsRef<str>>(&mut self, filenames: &[S]) -> TimelineResult<WindowState> {
        let clips = parse_all(filenames)?;
        Ok(self.set_clips(clips))
    }

    pub fn set_clips(&mut self, clips: Vec<ClipFile>) -> WindowState {
        self.clips = clips;
        let filter = self.state.filter_range.clone();
        self.set_filter_range(filter)
    }

    /// Swap in a new clip list without recomputing state or notifying
    /// listeners. The caller must follow up with [`set_filter_range`] or
    /// [`restore`], which rebuild everything from the new list.
    ///
    /// [`set_filter_range`]: Self::set_filter_range
    /// [`restore`]: Self::restore
    pub fn replace_clips(&mut self, clips: Vec<ClipFile>) {
        self.clips = clips;
    }

    /// Select a new filter range. The window defaults to a slice starting at
    /// the oldest matching clip and the playhead to that clip.
    pub fn set_filter_range(&mut self, range: DateRange) -> WindowState {
        self.filtered = range.filter_clips(&self.clips);
        let next = self.default_state(range);
        debug!(
            "filter '{}' keeps {} of {} clips",
            next.filter_range.name(),
            self.filtered.len(),
            self.clips.len()
        );
        self.apply(next)
    }

    /// Move the playhead to the clip at or after `at`, recentering the
    /// window when the clip falls outside it.
    pub fn set_playhead(&mut self, at: ClipTimestamp) -> WindowState {
        let Some(index) = nearest_clip_index(&self.filtered, at) else {
            return self.state.clone();
        };
        self.move_to_index(index)
    }

    /// Next newer clip, wrapping to the oldest.
    pub fn step_forward(&mut self) -> WindowState {
        let Some(current) = self.playhead_index() else {
            return self.state.clone();
        };
        let next = if current > 0 {
            current - 1
        } else {
            self.filtered.len() - 1
        };
        self.move_to_index(next)
    }

    /// Next older clip, wrapping to the newest.
    pub fn step_back(&mut self) -> WindowState {
        let Some(current) = self.playhead_index() else {
            return self.state.clone();
        };
        let next = if current + 1 >= self.filtered.len() {
            0
        } else {
            current + 1
        };
        self.move_to_index(next)
    }

    /// Seek to the instant `fraction` of the way along `axis`.
    pub fn scrub_to_pixel(&mut self, fraction: f64, axis: &DateRange) -> WindowState {
        match scrub_date(fraction, axis) {
            Some(at) => self.set_playhead(at),
            None => self.state.clone(),
        }
    }

    /// Resolve a pointer gesture on the date line. Spans shorter than the
    /// minimum drag are clicks and move the window (keeping its length) to
    /// start at the earlier point; longer spans become the window.
    pub fn select_window(&mut self, from: ClipTimestamp, to: ClipTimestamp) -> WindowState {
        if self.filtered.is_empty() {
            return self.state.clone();
        }
        let (start, end) = if from <= to { (from, to) } else { (to, from) };
        let duration = if end - start < self.config.min_drag() {
            self.state.window_range.duration()
        } else {
            end - start
        };

        let mut next = self.state.clone();
        next.window_range = clamp_into(&next.filter_range, start, duration);
        if let Some(oldest) = next.window_range.filter_clips(&self.filtered).last() {
            next.playhead = Some(oldest.start);
        }
        self.apply(next)
    }

    /// Seed state from a previously saved position. `window` is clamped into
    /// `filter`; `playhead` snaps to a clip and drags the window along.
    pub fn restore(
        &mut self,
        filter: DateRange,
        window: Option<DateRange>,
        playhead: Option<ClipTimestamp>,
    ) -> WindowState {
        self.filtered = filter.filter_clips(&self.clips);
        let mut next = self.default_state(filter);
        if next.is_empty() {
            return self.apply(next);
        }

        if let Some((start, end)) = window.as_ref().and_then(DateRange::bounds) {
            next.window_range = clamp_into(&next.filter_range, start, end - start);
        }
        if let Some(index) = playhead.and_then(|at| nearest_clip_index(&self.filtered, at)) {
            let at = self.filtered[index].start;
            next.window_range = recenter(&next.window_range, &next.filter_range, at);
            next.playhead = Some(at);
        }
        self.apply(next)
    }

    fn default_state(&self, filter: DateRange) -> WindowState {
        let (Some(oldest), Some((_, filter_end))) = (self.filtered.last(), filter.bounds()) else {
            return WindowState {
                filter_range: filter,
                window_range: DateRange::Empty,
                playhead: None,
            };
        };
        let divisor = self.config.window_divisor.max(1);
        let slice = Duration::milliseconds(filter.duration().num_milliseconds() / divisor as i64);
        let window_end = (oldest.start + slice).min(filter_end);
        WindowState {
            window_range: DateRange::new(WINDOW_RANGE_NAME, oldest.start, window_end),
            playhead: Some(oldest.start),
            filter_range: filter,
        }
    }

    fn move_to_index(&mut self, index: usize) -> WindowState {
        let Some(clip) = self.filtered.get(index) else {
            return self.state.clone();
        };
        let at = clip.start;
        let mut next = self.state.clone();
        next.window_range = recenter(&next.window_range, &next.filter_range, at);
        next.playhead = Some(at);
        self.apply(next)
    }

    fn apply(&mut self, next: WindowState) -> WindowState {
        let window_changed = next.window_range != self.state.window_range;
        let playhead_changed = next.playhead != self.state.playhead;
        self.state = next;

        for listener in &mut self.listeners {
            if window_changed {
                listener.on_window_changed(&self.state.window_range);
            }
            if playhead_changed {
                listener.on_playhead_changed(self.state.playhead);
            }
        }
        self.state.clone()
    }
}

/// Instant `fraction` (clamped to 0..=1) of the way along `axis`. The same
/// input always yields the same instant.
pub fn scrub_date(fraction: f64, axis: &DateRange) -> Option<ClipTimestamp> {
    let (start, _) = axis.bounds()?;
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let offset_ms = (axis.duration().num_milliseconds() as f64 * fraction).round() as i64;
    Some(start + Duration::milliseconds(offset_ms))
}

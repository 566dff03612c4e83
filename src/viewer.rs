use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;

use crate::divisions::{division_budget, find_date_divisions, DateDivision};
use crate::error::TimelineResult;
use crate::media::MediaUrls;
use crate::preferences::store::{DEFAULT_PLAYHEAD_TOLERANCE_MINS, DEFAULT_TTL_DAYS};
use crate::preferences::{snapshot, KeyValueStore, PreferenceExtras, PreferenceStore, SaveDebouncer};
use crate::segmentation::{group_clips, ActivitySegment, AxisSpan};
use crate::settings::EngineSettings;
use crate::timeline::{find_range, parse_all, valid_ranges, ClipTimestamp, DateRange};
use crate::window::{WindowController, WindowListener, WindowState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// One viewer's timeline: the offered ranges, the activity segments, the
/// window controller, and persistence of where the viewer left off.
pub struct ViewerSession {
    settings: EngineSettings,
    controller: WindowController,
    store: Arc<PreferenceStore>,
    debouncer: Option<SaveDebouncer>,
    media: MediaUrls,
    ranges: Vec<DateRange>,
    segments: Vec<ActivitySegment>,
    selected_range_name: String,
    extras: PreferenceExtras,
}

impl ViewerSession {
    pub fn new(settings: EngineSettings, kv: Box<dyn KeyValueStore>, namespace: &str) -> Self {
        let ttl = Duration::try_days(settings.preference_ttl_days).unwrap_or_else(|| {
            log_warn!("preferenceTtlDays {} is out of range", settings.preference_ttl_days);
            Duration::days(DEFAULT_TTL_DAYS)
        });
        let playhead_tolerance = Duration::try_minutes(settings.playhead_tolerance_mins)
            .unwrap_or_else(|| {
                log_warn!(
                    "playheadToleranceMins {} is out of range",
                    settings.playhead_tolerance_mins
                );
                Duration::minutes(DEFAULT_PLAYHEAD_TOLERANCE_MINS)
            });
        let store = PreferenceStore::new(kv, namespace)
            .with_ttl(ttl)
            .with_playhead_tolerance(playhead_tolerance);

        Self {
            controller: WindowController::new(settings.window()),
            store: Arc::new(store),
            debouncer: None,
            media: MediaUrls::new(settings.media_host.clone()),
            ranges: vec![DateRange::Empty],
            segments: Vec::new(),
            selected_range_name: DateRange::Empty.name().to_string(),
            extras: PreferenceExtras::default(),
            settings,
        }
    }

    /// Route saves through a debounced background writer. Outside a tokio
    /// runtime this does nothing and every save is written immediately.
    pub fn start_autosave(&mut self) {
        if self.debouncer.is_some() {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            log_warn!("No tokio runtime, preferences will be saved without debouncing");
            return;
        }
        self.debouncer = Some(SaveDebouncer::spawn(
            self.store.clone(),
            self.settings.save_debounce(),
        ));
    }

    pub fn is_autosaving(&self) -> bool {
        self.debouncer.is_some()
    }

    /// Flush any pending save and stop the background writer.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(mut debouncer) = self.debouncer.take() {
            debouncer
                .shutdown()
                .await
                .context("Failed to stop preference autosave")?;
        }
        Ok(())
    }

    pub fn subscribe(&mut self, listener: Box<dyn WindowListener>) {
        self.controller.subscribe(listener);
    }

    pub fn state(&self) -> &WindowState {
        self.controller.state()
    }

    pub fn controller(&self) -> &WindowController {
        &self.controller
    }

    pub fn ranges(&self) -> &[DateRange] {
        &self.ranges
    }

    pub fn segments(&self) -> &[ActivitySegment] {
        &self.segments
    }

    pub fn selected_range_name(&self) -> &str {
        &self.selected_range_name
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.store
    }

    pub fn set_extras(&mut self, extras: PreferenceExtras) {
        self.extras = extras;
    }

    /// Replace the whole file list (newest first) and position the viewer,
    /// either where saved preferences say or at the first offered range.
    pub fn load_file_list<S: AsRef<str>>(
        &mut self,
        filenames: &[S],
        now: ClipTimestamp,
    ) -> Result<WindowState> {
        let ranges = valid_ranges(filenames, now).context("Failed to derive ranges")?;
        let clips = parse_all(filenames).context("Failed to parse file list")?;
        self.segments = group_clips(&clips, &self.settings.segmentation());
        self.ranges = ranges;
        // Listeners only hear about the final position below.
        self.controller.replace_clips(clips);

        if let Some(state) = self.restore_saved(filenames, now) {
            return Ok(state);
        }

        let default_range = self.ranges.first().cloned().unwrap_or_default();
        log_debug!("Starting at default range '{}'", default_range.name());
        self.selected_range_name = default_range.name().to_string();
        Ok(self.controller.set_filter_range(default_range))
    }

    fn restore_saved<S: AsRef<str>>(
        &mut self,
        filenames: &[S],
        now: ClipTimestamp,
    ) -> Option<WindowState> {
        let prefs = self.store.load()?;
        let view = self
            .store
            .validate_against_file_list(&prefs, filenames, &self.ranges, now)?;
        let filter = find_range(&self.ranges, &prefs.selected_range_name)
            .ok()?
            .clone();

        log_info!(
            "Restoring viewer at '{}' with playhead {}",
            filter.name(),
            view.playhead
        );
        self.selected_range_name = prefs.selected_range_name.clone();
        self.extras = prefs.extras.clone();
        Some(
            self.controller
                .restore(filter, view.window_range, Some(view.playhead)),
        )
    }

    pub fn select_range(&mut self, name: &str) -> TimelineResult<WindowState> {
        let range = find_range(&self.ranges, name)?.clone();
        self.selected_range_name = range.name().to_string();
        let state = self.controller.set_filter_range(range);
        self.schedule_save();
        Ok(state)
    }

    pub fn set_playhead(&mut self, at: ClipTimestamp) -> WindowState {
        let state = self.controller.set_playhead(at);
        self.schedule_save();
        state
    }

    pub fn step_forward(&mut self) -> WindowState {
        let state = self.controller.step_forward();
        self.schedule_save();
        state
    }

    pub fn step_back(&mut self) -> WindowState {
        let state = self.controller.step_back();
        self.schedule_save();
        state
    }

    /// Scrub along the window (the zoomed date line).
    pub fn scrub_window(&mut self, fraction: f64) -> WindowState {
        let axis = self.controller.state().window_range.clone();
        let state = self.controller.scrub_to_pixel(fraction, &axis);
        self.schedule_save();
        state
    }

    /// Scrub along the filter range (the full date line).
    pub fn scrub_filter(&mut self, fraction: f64) -> WindowState {
        let axis = self.controller.state().filter_range.clone();
        let state = self.controller.scrub_to_pixel(fraction, &axis);
        self.schedule_save();
        state
    }

    pub fn select_window(&mut self, from: ClipTimestamp, to: ClipTimestamp) -> WindowState {
        let state = self.controller.select_window(from, to);
        self.schedule_save();
        state
    }

    /// Ticks for the full date line, sized to the selected range.
    pub fn filter_divisions(&self) -> Vec<DateDivision> {
        let filter = &self.controller.state().filter_range;
        find_date_divisions(filter, division_budget(filter))
    }

    /// Ticks for the zoomed date line.
    pub fn window_divisions(&self) -> Vec<DateDivision> {
        let filter = &self.controller.state().filter_range;
        find_date_divisions(&self.controller.state().window_range, division_budget(filter))
    }

    /// Activity markers for the full date line, one per segment that
    /// overlaps the selected range.
    pub fn activity_markers(&self) -> Vec<AxisSpan> {
        let filter = &self.controller.state().filter_range;
        let Some((start, end)) = filter.bounds() else {
            return Vec::new();
        };
        self.segments
            .iter()
            .filter(|segment| segment.range.overlaps(start, end))
            .filter_map(|segment| segment.axis_fraction(filter))
            .collect()
    }

    pub fn current_clip_url(&self) -> Option<String> {
        self.controller
            .current_clip()
            .map(|clip| self.media.clip_video_url(clip))
    }

    pub fn media(&self) -> &MediaUrls {
        &self.media
    }

    /// Queue the current position for saving. Nothing is saved while there
    /// are no clips to point at.
    pub fn schedule_save(&self) {
        let Some(prefs) = self.current_preferences() else {
            return;
        };
        match &self.debouncer {
            Some(debouncer) => debouncer.schedule(prefs),
            None => self.store.write(&prefs),
        }
    }

    /// Write the current position right away, bypassing the debouncer.
    pub fn save_now(&self) {
        if let Some(prefs) = self.current_preferences() {
            self.store.write(&prefs);
        }
    }

    fn current_preferences(&self) -> Option<crate::preferences::ViewerPreferences> {
        let state = self.controller.state();
        if state.filter_range.is_empty() {
            return None;
        }
        let playhead = state.playhead?;
        Some(snapshot(
            &self.selected_range_name,
            &state.filter_range,
            &state.window_range,
            playhead,
            self.extras.clone(),
        ))
    }
}

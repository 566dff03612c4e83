use chrono::{Duration, NaiveDateTime, Utc};

use super::kv::KeyValueStore;
use super::model::{
    PreferenceExtras, RestoredView, SerializedDateRange, ViewerPreferences, SCHEMA_VERSION,
};
use crate::timeline::clock::to_epoch_ms;
use crate::timeline::{parse_filename_date, ClipTimestamp, DateRange};

// Set to false to silence preference bookkeeping in the logs
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

pub const STORAGE_KEY_PREFIX: &str = "clip_viewer_prefs";
pub const DEFAULT_TTL_DAYS: i64 = 30;
pub const DEFAULT_PLAYHEAD_TOLERANCE_MINS: i64 = 60;

/// Storage key for a viewer namespace (usually the recorder host), with
/// anything that is not ASCII alphanumeric replaced by `_`.
pub fn storage_key(namespace: &str) -> String {
    let sanitized: String = namespace
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{STORAGE_KEY_PREFIX}_{sanitized}")
}

/// Saves and restores the viewing position for one namespace.
///
/// Nothing here ever fails loudly: storage errors are logged and dropped,
/// and any record that is unreadable, stale, or from an incompatible schema
/// is cleared and reported as absent.
pub struct PreferenceStore {
    kv: Box<dyn KeyValueStore>,
    key: String,
    ttl: Duration,
    playhead_tolerance: Duration,
}

impl PreferenceStore {
    pub fn new(kv: Box<dyn KeyValueStore>, namespace: &str) -> Self {
        Self {
            kv,
            key: storage_key(namespace),
            ttl: Duration::days(DEFAULT_TTL_DAYS),
            playhead_tolerance: Duration::minutes(DEFAULT_PLAYHEAD_TOLERANCE_MINS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_playhead_tolerance(mut self, tolerance: Duration) -> Self {
        self.playhead_tolerance = tolerance;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(
        &self,
        selected_range_name: &str,
        filter_range: &DateRange,
        window_range: &DateRange,
        playhead: ClipTimestamp,
        extras: PreferenceExtras,
    ) -> ViewerPreferences {
        let prefs = snapshot(selected_range_name, filter_range, window_range, playhead, extras);
        self.write(&prefs);
        prefs
    }

    /// Replace the stored record. Failures are logged, never returned.
    pub fn write(&self, prefs: &ViewerPreferences) {
        let serialized = match serde_json::to_string(prefs) {
            Ok(serialized) => serialized,
            Err(err) => {
                log_warn!("Failed to serialize viewer preferences: {err}");
                return;
            }
        };
        match self.kv.set(&self.key, &serialized) {
            Ok(()) => log_debug!("Viewer preferences saved under {}", self.key),
            Err(err) => log_warn!(
                "Failed to save viewer preferences under {}: {err:#}",
                self.key
            ),
        }
    }

    pub fn load(&self) -> Option<ViewerPreferences> {
        self.load_at(Utc::now().timestamp_millis())
    }

    /// Load as of `now_ms` (epoch ms).
    pub fn load_at(&self, now_ms: i64) -> Option<ViewerPreferences> {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log_debug!("No viewer preferences stored under {}", self.key);
                return None;
            }
            Err(err) => {
                log_warn!("Failed to read viewer preferences: {err:#}");
                return None;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                log_warn!("Viewer preferences are not valid JSON ({err}), clearing");
                self.clear();
                return None;
            }
        };

        let prefs: ViewerPreferences = match serde_json::from_value(value) {
            Ok(prefs) => prefs,
            Err(err) => {
                log_warn!("Viewer preferences have an invalid shape ({err}), clearing");
                self.clear();
                return None;
            }
        };

        if !prefs.ranges_ordered() {
            log_warn!("Viewer preferences contain a reversed range, clearing");
            self.clear();
            return None;
        }

        if !prefs.is_compatible() {
            log_debug!(
                "Viewer preferences version {} is incompatible, clearing",
                prefs.version
            );
            self.clear();
            return None;
        }

        let Some(age_ms) = now_ms.checked_sub(prefs.last_saved) else {
            log_warn!("Viewer preferences have an impossible save time, clearing");
            self.clear();
            return None;
        };
        if age_ms > self.ttl.num_milliseconds() {
            log_debug!("Viewer preferences expired, clearing");
            self.clear();
            return None;
        }

        Some(prefs)
    }

    pub fn clear(&self) {
        if let Err(err) = self.kv.remove(&self.key) {
            log_warn!("Failed to clear viewer preferences: {err:#}");
        }
    }

    /// Check saved preferences against the current, newest-first file list.
    ///
    /// Either everything checks out or `None` comes back; there is no
    /// partial restore.
    pub fn validate_against_file_list<S: AsRef<str>>(
        &self,
        prefs: &ViewerPreferences,
        filenames: &[S],
        valid_ranges: &[DateRange],
        now: ClipTimestamp,
    ) -> Option<RestoredView> {
        if !valid_ranges
            .iter()
            .any(|range| range.name() == prefs.selected_range_name)
        {
            log_debug!(
                "Saved range '{}' is no longer offered",
                prefs.selected_range_name
            );
            return None;
        }

        let (newest, oldest) = match file_span(filenames) {
            Some(span) => span,
            None => {
                log_debug!("No parseable files to restore preferences against");
                return None;
            }
        };

        let filter_range =
            restore_range(prefs.filter_range.as_ref(), oldest, newest, now, "filter")?;
        let window_range =
            restore_range(prefs.window_range.as_ref(), oldest, newest, now, "window")?;

        let playhead = prefs.playhead()?;
        let earliest_ok = oldest
            .checked_sub_signed(self.playhead_tolerance)
            .unwrap_or(NaiveDateTime::MIN);
        let latest_ok = newest
            .checked_add_signed(self.playhead_tolerance)
            .unwrap_or(NaiveDateTime::MAX);
        if playhead > now || playhead < earliest_ok || playhead > latest_ok {
            log_debug!("Saved playhead {playhead} is outside the recorded span");
            return None;
        }

        Some(RestoredView {
            filter_range,
            window_range,
            playhead,
        })
    }
}

/// Build a record stamped with the current time without writing it.
pub fn snapshot(
    selected_range_name: &str,
    filter_range: &DateRange,
    window_range: &DateRange,
    playhead: ClipTimestamp,
    extras: PreferenceExtras,
) -> ViewerPreferences {
    ViewerPreferences {
        selected_range_name: selected_range_name.to_string(),
        filter_range: SerializedDateRange::from_range(filter_range),
        window_range: SerializedDateRange::from_range(window_range),
        playhead_position: to_epoch_ms(&playhead),
        last_saved: Utc::now().timestamp_millis(),
        version: SCHEMA_VERSION.to_string(),
        extras,
    }
}

fn file_span<S: AsRef<str>>(filenames: &[S]) -> Option<(ClipTimestamp, ClipTimestamp)> {
    let newest = parse_filename_date(filenames.first()?.as_ref()).ok()?;
    let oldest = parse_filename_date(filenames.last()?.as_ref()).ok()?;
    Some((newest, oldest))
}

/// `Some(None)` when nothing was saved, `Some(Some(range))` when the saved
/// range still overlaps the recordings, `None` to reject the whole record.
fn restore_range(
    saved: Option<&SerializedDateRange>,
    oldest: ClipTimestamp,
    newest: ClipTimestamp,
    now: ClipTimestamp,
    what: &str,
) -> Option<Option<DateRange>> {
    let Some(saved) = saved else {
        return Some(None);
    };
    let range = saved.to_range()?;
    let starts_in_future = range.start().map(|start| start > now).unwrap_or(true);
    if starts_in_future || !range.overlaps(oldest, newest) {
        log_debug!("Saved {what} range '{}' no longer matches the recordings", range.name());
        return None;
    }
    Some(Some(range))
}

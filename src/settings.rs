use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::preferences::store::{DEFAULT_PLAYHEAD_TOLERANCE_MINS, DEFAULT_TTL_DAYS};
use crate::preferences::DEFAULT_QUIET_PERIOD_MS;
use crate::segmentation::SegmentationConfig;
use crate::timeline::CLIP_DURATION_SECS;
use crate::window::WindowConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    pub clip_duration_secs: i64,
    pub gap_tolerance_ms: i64,
    pub preference_ttl_days: i64,
    pub playhead_tolerance_mins: i64,
    pub save_debounce_ms: u64,
    pub window_divisor: i32,
    pub min_drag_secs: i64,
    /// `host[:port]` serving recordings
    pub media_host: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let segmentation = SegmentationConfig::default();
        let window = WindowConfig::default();
        Self {
            clip_duration_secs: CLIP_DURATION_SECS,
            gap_tolerance_ms: segmentation.gap_tolerance_ms,
            preference_ttl_days: DEFAULT_TTL_DAYS,
            playhead_tolerance_mins: DEFAULT_PLAYHEAD_TOLERANCE_MINS,
            save_debounce_ms: DEFAULT_QUIET_PERIOD_MS,
            window_divisor: window.window_divisor,
            min_drag_secs: window.min_drag_secs,
            media_host: "localhost:5801".into(),
        }
    }
}

impl EngineSettings {
    pub fn segmentation(&self) -> SegmentationConfig {
        SegmentationConfig {
            clip_duration_secs: self.clip_duration_secs,
            gap_tolerance_ms: self.gap_tolerance_ms,
        }
    }

    pub fn window(&self) -> WindowConfig {
        WindowConfig {
            window_divisor: self.window_divisor,
            min_drag_secs: self.min_drag_secs,
        }
    }

    pub fn save_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.save_debounce_ms)
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<EngineSettings>,
}

impl SettingsStore {
    /// Missing or unreadable-as-JSON files fall back to defaults; only I/O
    /// errors on an existing file are reported.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            EngineSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn engine(&self) -> EngineSettings {
        self.data.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn update(&self, settings: EngineSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(|e| e.into_inner());
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &EngineSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.engine(), EngineSettings::default());
        assert_eq!(store.engine().segmentation().gap_tolerance_ms, 1_000);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "gapToleranceMs": 5000, "mediaHost": "10.0.0.2" }"#).unwrap();

        let engine = SettingsStore::new(path).unwrap().engine();
        assert_eq!(engine.gap_tolerance_ms, 5_000);
        assert_eq!(engine.media_host, "10.0.0.2");
        assert_eq!(engine.window_divisor, 6);
    }

    #[test]
    fn test_garbage_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(SettingsStore::new(path).unwrap().engine(), EngineSettings::default());
    }

    #[test]
    fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut engine = store.engine();
        engine.save_debounce_ms = 500;
        store.update(engine.clone()).unwrap();

        assert_eq!(SettingsStore::new(path).unwrap().engine(), engine);
    }
}

use serde::{Deserialize, Serialize};

use crate::timeline::clock::{from_epoch_ms, to_epoch_ms};
use crate::timeline::{ClipTimestamp, DateRange};

pub const SCHEMA_VERSION: &str = "1.0.0";

/// `DateRange` as stored: epoch milliseconds instead of wall-clock values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedDateRange {
    pub name: String,
    pub start_time: i64,
    pub end_time: i64,
}

impl SerializedDateRange {
    /// `None` for the empty sentinel, which is never persisted.
    pub fn from_range(range: &DateRange) -> Option<Self> {
        let (start, end) = range.bounds()?;
        Some(Self {
            name: range.name().to_string(),
            start_time: to_epoch_ms(&start),
            end_time: to_epoch_ms(&end),
        })
    }

    pub fn to_range(&self) -> Option<DateRange> {
        let start = from_epoch_ms(self.start_time)?;
        let end = from_epoch_ms(self.end_time)?;
        Some(DateRange::new(self.name.clone(), start, end))
    }

    pub fn is_ordered(&self) -> bool {
        self.start_time <= self.end_time
    }
}

/// Optional viewer toggles saved next to the position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_enabled: Option<bool>,
}

/// The persisted record. Unknown fields written by newer builds are
/// ignored on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerPreferences {
    pub selected_range_name: String,
    #[serde(default)]
    pub filter_range: Option<SerializedDateRange>,
    #[serde(default)]
    pub window_range: Option<SerializedDateRange>,
    /// Epoch ms.
    pub playhead_position: i64,
    /// Epoch ms, UTC wall time of the write.
    pub last_saved: i64,
    pub version: String,
    #[serde(flatten)]
    pub extras: PreferenceExtras,
}

impl ViewerPreferences {
    pub fn playhead(&self) -> Option<ClipTimestamp> {
        from_epoch_ms(self.playhead_position)
    }

    pub fn ranges_ordered(&self) -> bool {
        [&self.filter_range, &self.window_range]
            .into_iter()
            .flatten()
            .all(SerializedDateRange::is_ordered)
    }

    /// Records from another major schema version are discarded whole.
    pub fn is_compatible(&self) -> bool {
        major_version(&self.version) == major_version(SCHEMA_VERSION)
    }
}

fn major_version(version: &str) -> Option<u64> {
    version.split('.').next()?.trim().parse().ok()
}

/// Position recovered from preferences that survived validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredView {
    pub filter_range: Option<DateRange>,
    pub window_range: Option<DateRange>,
    pub playhead: ClipTimestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{
            "selectedRangeName": "Last 7 days",
            "filterRange": null,
            "playheadPosition": 1700000000000,
            "lastSaved": 1700000000000,
            "version": "1.4.0",
            "thumbnailSize": "large"
        }"#;
        let prefs: ViewerPreferences = serde_json::from_str(json).unwrap();
        assert!(prefs.is_compatible());
        assert_eq!(prefs.window_range, None);
        assert_eq!(prefs.extras, PreferenceExtras::default());
    }

    #[test]
    fn test_major_version_bump_is_incompatible() {
        let json = r#"{
            "selectedRangeName": "Last 7 days",
            "playheadPosition": 0,
            "lastSaved": 0,
            "version": "2.0.0"
        }"#;
        let prefs: ViewerPreferences = serde_json::from_str(json).unwrap();
        assert!(!prefs.is_compatible());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let json = r#"{ "selectedRangeName": "Last 7 days", "version": "1.0.0" }"#;
        assert!(serde_json::from_str::<ViewerPreferences>(json).is_err());
    }

    #[test]
    fn test_extras_serialize_camel_case() {
        let prefs = ViewerPreferences {
            selected_range_name: "All time".into(),
            filter_range: None,
            window_range: None,
            playhead_position: 1,
            last_saved: 2,
            version: SCHEMA_VERSION.into(),
            extras: PreferenceExtras {
                feed_type: Some("webrtc".into()),
                audio_enabled: Some(true),
            },
        };
        let value = serde_json::to_value(&prefs).unwrap();
        assert_eq!(value["feedType"], "webrtc");
        assert_eq!(value["audioEnabled"], true);
        assert_eq!(value["selectedRangeName"], "All time");
    }
}

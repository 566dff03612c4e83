pub mod divisions;
pub mod error;
pub mod media;
pub mod preferences;
pub mod segmentation;
pub mod settings;
pub mod timeline;
pub mod utils;
pub mod viewer;
pub mod window;

pub use divisions::{division_budget, find_date_divisions, DateDivision, DivisionType};
pub use error::{TimelineError, TimelineResult};
pub use media::MediaUrls;
pub use preferences::{
    FileStore, KeyValueStore, MemoryStore, PreferenceStore, SaveDebouncer, ViewerPreferences,
};
pub use segmentation::{contiguous_ranges, ActivitySegment, AxisSpan, SegmentationConfig};
pub use settings::{EngineSettings, SettingsStore};
pub use timeline::{
    format_filename_date, now_local, parse_filename_date, valid_ranges, ClipFile, ClipTimestamp,
    DateRange,
};
pub use viewer::ViewerSession;
pub use window::{WindowConfig, WindowController, WindowListener, WindowState};

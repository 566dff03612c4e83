pub mod debounce;
pub mod kv;
pub mod model;
pub mod store;

pub use debounce::{SaveDebouncer, DEFAULT_QUIET_PERIOD_MS};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use model::{
    PreferenceExtras, RestoredView, SerializedDateRange, ViewerPreferences, SCHEMA_VERSION,
};
pub use store::{snapshot, storage_key, PreferenceStore};

pub mod config;
pub mod controller;
pub mod state;

pub use config::WindowConfig;
pub use controller::{scrub_date, WindowController, WindowListener};
pub use state::{nearest_clip_index, WindowState, WINDOW_RANGE_NAME};

use chrono::Duration;

/// Tunables for the scrub window.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Default window length is the filter length divided by this
    pub window_divisor: i32,

    /// Pointer drags spanning less than this are treated as clicks
    pub min_drag_secs: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_divisor: 6,
            min_drag_secs: 5 * 60,
        }
    }
}

impl WindowConfig {
    pub fn min_drag(&self) -> Duration {
        Duration::seconds(self.min_drag_secs)
    }
}

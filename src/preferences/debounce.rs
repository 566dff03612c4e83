use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::model::ViewerPreferences;
use super::store::PreferenceStore;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

pub const DEFAULT_QUIET_PERIOD_MS: u64 = 2000;

/// Coalesces bursts of preference saves into one write once the viewer has
/// been idle for the quiet period. Only the newest record is written.
pub struct SaveDebouncer {
    tx: Option<mpsc::UnboundedSender<ViewerPreferences>>,
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl SaveDebouncer {
    /// Must be called from within a tokio runtime.
    pub fn spawn(store: Arc<PreferenceStore>, quiet_period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(debounce_loop(store, rx, quiet_period, cancel_token.clone()));

        Self {
            tx: Some(tx),
            handle: Some(handle),
            cancel_token,
        }
    }

    /// Queue a record, replacing anything still waiting, and restart the
    /// quiet period.
    pub fn schedule(&self, prefs: ViewerPreferences) {
        if let Some(tx) = &self.tx {
            if tx.send(prefs).is_err() {
                log_debug!("Save debouncer already stopped, dropping preferences");
            }
        }
    }

    /// Write whatever is pending right away and stop the task.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.tx.take();
        self.cancel_token.cancel();

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("preference save task failed to join")
        } else {
            Ok(())
        }
    }
}

impl Drop for SaveDebouncer {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn debounce_loop(
    store: Arc<PreferenceStore>,
    mut rx: mpsc::UnboundedReceiver<ViewerPreferences>,
    quiet_period: Duration,
    cancel_token: CancellationToken,
) {
    let mut pending: Option<ViewerPreferences> = None;

    loop {
        if pending.is_none() {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                received = rx.recv() => match received {
                    Some(prefs) => pending = Some(prefs),
                    None => break,
                },
            }
            continue;
        }

        tokio::select! {
            _ = cancel_token.cancelled() => break,
            received = rx.recv() => match received {
                Some(prefs) => pending = Some(prefs),
                None => break,
            },
            _ = tokio::time::sleep(quiet_period) => {
                if let Some(prefs) = pending.take() {
                    store.write(&prefs);
                }
            }
        }
    }

    // Drain anything sent right before shutdown so the newest record wins.
    while let Ok(prefs) = rx.try_recv() {
        pending = Some(prefs);
    }
    if let Some(prefs) = pending.take() {
        log_info!("Flushing pending viewer preferences on shutdown");
        store.write(&prefs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::kv::{KeyValueStore, MemoryStore};
    use crate::preferences::model::SCHEMA_VERSION;
    use std::sync::Mutex;

    /// Counts writes and keeps the last value.
    #[derive(Default)]
    struct Recording {
        inner: MemoryStore,
        writes: Mutex<usize>,
    }

    struct Handle(Arc<Recording>);

    impl KeyValueStore for Handle {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            *self.0.writes.lock().unwrap() += 1;
            self.0.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.0.inner.remove(key)
        }
    }

    fn prefs(playhead: i64) -> ViewerPreferences {
        ViewerPreferences {
            selected_range_name: "All time".into(),
            filter_range: None,
            window_range: None,
            playhead_position: playhead,
            last_saved: chrono::Utc::now().timestamp_millis(),
            version: SCHEMA_VERSION.into(),
            extras: Default::default(),
        }
    }

    fn setup() -> (Arc<PreferenceStore>, Arc<Recording>) {
        let recording = Arc::new(Recording::default());
        let store = Arc::new(PreferenceStore::new(Box::new(Handle(recording.clone())), "robot"));
        (store, recording)
    }

    fn writes(recording: &Recording) -> usize {
        *recording.writes.lock().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_written_once_after_quiet_period() {
        let (store, recording) = setup();
        let mut debouncer = SaveDebouncer::spawn(store.clone(), Duration::from_millis(2000));

        for playhead in 1..=5 {
            debouncer.schedule(prefs(playhead));
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        assert_eq!(writes(&recording), 0);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(writes(&recording), 1);
        assert_eq!(store.load().map(|p| p.playhead_position), Some(5));

        debouncer.shutdown().await.unwrap();
        assert_eq!(writes(&recording), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_record() {
        let (store, recording) = setup();
        let mut debouncer = SaveDebouncer::spawn(store.clone(), Duration::from_millis(2000));

        debouncer.schedule(prefs(7));
        debouncer.schedule(prefs(8));
        debouncer.shutdown().await.unwrap();

        assert_eq!(writes(&recording), 1);
        assert_eq!(store.load().map(|p| p.playhead_position), Some(8));

        debouncer.schedule(prefs(9));
        assert_eq!(writes(&recording), 1);
    }
}

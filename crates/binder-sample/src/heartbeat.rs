//! Logs a heartbeat on every timer tick and keeps count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use app_runtime::timer::{TimerError, TIMER};
use async_trait::async_trait;
use module_binder::{Binder, BoxError, Handle, Key, Module};
use tracing::{debug, info};

pub const HEARTBEAT: Handle<HeartbeatModule> = Handle::new("heartbeat");

const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum HeartbeatError {
    #[error("heartbeat could not be scheduled: {0}")]
    Schedule(#[from] TimerError),
}

#[derive(Debug)]
pub struct HeartbeatModule {
    interval: Duration,
    beats: Arc<AtomicU64>,
}

impl Default for HeartbeatModule {
    fn default() -> Self {
        Self::new()
    }
}

impl HeartbeatModule {
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            beats: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Beats observed so far.
    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }

    /// Shared handle on the beat count, readable after the module was handed to a binder.
    pub fn beat_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.beats)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Module for HeartbeatModule {
    fn name(&self) -> Key {
        HEARTBEAT.key()
    }

    fn depends(&self) -> Vec<Key> {
        vec![TIMER.key()]
    }

    fn configure(&mut self, binder: &Binder) -> Result<(), BoxError> {
        let timer = TIMER.get(binder)?;
        let beats = Arc::clone(&self.beats);
        timer
            .register(self.interval, move |_ctx, _at| {
                let beat = beats.fetch_add(1, Ordering::Relaxed) + 1;
                async move {
                    info!(beat, "Heartbeat");
                    Ok::<(), BoxError>(())
                }
            })
            .map_err(HeartbeatError::from)?;

        debug!(interval = ?self.interval, "Heartbeat scheduled");
        Ok(())
    }

    // Work happens in the timer's callback; the default `run` returns at once.
}

//! Simulated audio engine
//!
//! Stands in for a real decoder/output: no audio is produced, but the handle
//! keeps a clock, honours play/pause/seek/rate, and pushes status reports on
//! a tokio interval exactly like a platform engine would.

use async_trait::async_trait;
use mediacore_core::MediaItem;
use mediacore_playback::{
    AudioEngine, EngineHandle, EngineStatus, LoadOptions, PlaybackError, Result, StatusSink,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// URLs with this prefix fail to load, for exercising error paths
pub const FAILING_URL_PREFIX: &str = "fail:";

pub struct SimulatedEngine {
    durations: HashMap<String, Duration>,
    default_duration: Duration,
    speed: f32,
}

impl SimulatedEngine {
    pub fn new(default_duration: Duration, speed: f32) -> Self {
        Self {
            durations: HashMap::new(),
            default_duration,
            speed,
        }
    }

    /// Learn source lengths from catalog items
    #[must_use]
    pub fn with_items(mut self, items: &[MediaItem]) -> Self {
        for item in items {
            if let Some(ms) = item.duration_ms.filter(|&ms| ms > 0) {
                self.durations
                    .insert(item.playable_url().to_string(), Duration::from_millis(ms));
            }
        }
        self
    }

    fn duration_of(&self, url: &str) -> Duration {
        self.durations
            .get(url)
            .copied()
            .unwrap_or(self.default_duration)
    }
}

#[derive(Debug)]
struct Clock {
    position: Duration,
    duration: Duration,
    playing: bool,
    rate: f32,
    loaded: bool,
}

impl Clock {
    fn status(&self) -> EngineStatus {
        EngineStatus {
            is_loaded: self.loaded,
            position: self.position,
            duration: Some(self.duration),
            is_playing: self.playing,
            ..EngineStatus::default()
        }
    }

    /// Advance by `elapsed` wall time; returns `true` when the end is reached
    fn advance(&mut self, elapsed: Duration, speed: f32) -> bool {
        if !self.playing || !self.loaded {
            return false;
        }
        self.position += elapsed.mul_f32(self.rate * speed);
        if self.position >= self.duration {
            self.position = self.duration;
            self.playing = false;
            return true;
        }
        false
    }
}

fn lock(clock: &Mutex<Clock>) -> Result<MutexGuard<'_, Clock>> {
    clock
        .lock()
        .map_err(|_| PlaybackError::command("lock", "simulated clock poisoned"))
}

pub struct SimulatedHandle {
    url: String,
    clock: Arc<Mutex<Clock>>,
    ticker: JoinHandle<()>,
}

#[async_trait]
impl AudioEngine for SimulatedEngine {
    type Handle = SimulatedHandle;

    async fn load(&self, url: &str, options: LoadOptions, sink: StatusSink) -> Result<(SimulatedHandle, EngineStatus)> {
        if url.starts_with(FAILING_URL_PREFIX) {
            return Err(PlaybackError::Load(format!("cannot open {url}")));
        }

        let clock = Arc::new(Mutex::new(Clock {
            position: Duration::ZERO,
            duration: self.duration_of(url),
            playing: options.autoplay,
            rate: options.rate,
            loaded: true,
        }));
        let status = lock(&clock)?.status();

        let ticker = tokio::spawn(tick(
            Arc::clone(&clock),
            sink,
            options.status_interval,
            self.speed,
        ));

        debug!(url = %url, autoplay = options.autoplay, "Simulated source loaded");
        let handle = SimulatedHandle {
            url: url.to_string(),
            clock,
            ticker,
        };
        Ok((handle, status))
    }
}

async fn tick(clock: Arc<Mutex<Clock>>, sink: StatusSink, interval: Duration, speed: f32) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let status = {
            let Ok(mut clock) = clock.lock() else {
                return;
            };
            let finished = clock.advance(interval, speed);
            EngineStatus {
                did_finish: finished,
                ..clock.status()
            }
        };
        if !sink.report(status) {
            trace!("Session gone, stopping simulated clock");
            return;
        }
    }
}

#[async_trait]
impl EngineHandle for SimulatedHandle {
    async fn status(&self) -> Result<EngineStatus> {
        Ok(lock(&self.clock)?.status())
    }

    async fn play(&mut self) -> Result<()> {
        let mut clock = lock(&self.clock)?;
        if clock.position >= clock.duration {
            clock.position = Duration::ZERO;
        }
        clock.playing = true;
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        lock(&self.clock)?.playing = false;
        Ok(())
    }

    async fn seek(&mut self, position: Duration) -> Result<()> {
        let mut clock = lock(&self.clock)?;
        clock.position = position.min(clock.duration);
        Ok(())
    }

    async fn set_rate(&mut self, rate: f32) -> Result<()> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(PlaybackError::command("set_rate", format!("invalid rate {rate}")));
        }
        lock(&self.clock)?.rate = rate;
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        self.ticker.abort();
        let mut clock = lock(&self.clock)?;
        clock.loaded = false;
        clock.playing = false;
        debug!(url = %self.url, "Simulated source unloaded");
        Ok(())
    }
}

impl Drop for SimulatedHandle {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

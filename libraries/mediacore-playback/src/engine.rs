//! Audio engine contract
//!
//! What the session controller needs from a concrete engine: load a URL into
//! a handle, drive that handle, and push periodic status reports into a
//! [`StatusSink`]. Every call is async and may fail independently.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

/// Options passed to [`AudioEngine::load`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Start playing as soon as the source is loaded
    pub autoplay: bool,

    /// Initial playback rate
    pub rate: f32,

    /// How often the engine should push status reports
    pub status_interval: Duration,
}

/// Engine-side view of a loaded source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineStatus {
    pub is_loaded: bool,

    pub position: Duration,

    /// `None` for live streams or before the container is probed
    pub duration: Option<Duration>,

    pub is_playing: bool,

    pub is_buffering: bool,

    /// Set once when playback reaches the natural end of the source
    pub did_finish: bool,

    /// Playback error reported asynchronously by the engine
    pub error: Option<String>,
}

impl EngineStatus {
    /// Status of a freshly loaded source
    pub fn loaded(position: Duration, duration: Option<Duration>, is_playing: bool) -> Self {
        Self {
            is_loaded: true,
            position,
            duration,
            is_playing,
            ..Self::default()
        }
    }
}

/// Status report tagged with the load it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Load generation the reporting handle was created in
    pub generation: u64,

    pub status: EngineStatus,
}

/// Where an engine handle pushes its status reports
///
/// Each load gets a sink stamped with a fresh generation. Once the handle is
/// replaced, reports still arriving through the old sink are ignored.
#[derive(Debug, Clone)]
pub struct StatusSink {
    generation: u64,
    tx: mpsc::UnboundedSender<StatusReport>,
}

impl StatusSink {
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<StatusReport>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Push a status report
    ///
    /// Returns `false` once the session is gone; engines should stop their
    /// status loop at that point.
    pub fn report(&self, status: EngineStatus) -> bool {
        self.tx
            .send(StatusReport {
                generation: self.generation,
                status,
            })
            .is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Factory for engine handles
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Handle type produced by a successful load
    type Handle: EngineHandle;

    /// Load `url` and start pushing status into `sink`
    ///
    /// # Errors
    /// Returns an error if the source cannot be opened
    async fn load(&self, url: &str, options: LoadOptions, sink: StatusSink) -> Result<(Self::Handle, EngineStatus)>;
}

/// One loaded, playable source
///
/// The controller owns at most one handle at a time and always calls
/// [`EngineHandle::unload`] before dropping it.
#[async_trait]
pub trait EngineHandle: Send + Sync {
    /// Current engine status
    async fn status(&self) -> Result<EngineStatus>;

    async fn play(&mut self) -> Result<()>;

    async fn pause(&mut self) -> Result<()>;

    async fn seek(&mut self, position: Duration) -> Result<()>;

    async fn set_rate(&mut self, rate: f32) -> Result<()>;

    /// Release the source; no status reports may follow
    async fn unload(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_tags_reports_with_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = StatusSink::new(7, tx);

        assert!(sink.report(EngineStatus::loaded(Duration::from_secs(1), None, true)));
        let report = rx.try_recv().unwrap();
        assert_eq!(report.generation, 7);
        assert!(report.status.is_playing);
        assert_eq!(report.status.position, Duration::from_secs(1));
    }

    #[test]
    fn sink_reports_closed_session() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = StatusSink::new(1, tx);
        drop(rx);

        assert!(sink.is_closed());
        assert!(!sink.report(EngineStatus::default()));
    }
}

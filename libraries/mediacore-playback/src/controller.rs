//! Audio session controller
//!
//! The only component that talks to the audio engine. It watches the shared
//! store and turns intent changes into engine commands, and it turns engine
//! status reports back into store updates. Engine failures never escape: they
//! are logged and the store falls back to a paused, non-buffering state.
//!
//! # Example
//!
//! ```rust,ignore
//! let store = SharedStore::with_config(PlaybackConfig::default());
//! let controller = AudioSessionController::new(engine, store.clone());
//! let (session, task) = controller.spawn();
//!
//! session.play_track(item).await?;
//! session.toggle_play().await?;
//! session.shutdown().await?;
//! task.await?;
//! ```

use crate::engine::{AudioEngine, EngineHandle, LoadOptions, StatusReport, StatusSink};
use crate::error::{PlaybackError, Result};
use crate::guard::SyncGuard;
use crate::shared::SharedStore;
use crate::types::RepeatMode;
use mediacore_core::MediaItem;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Upper bound on load attempts per sync when the current track keeps moving
const MAX_SYNC_PASSES: usize = 4;

/// Capacity of the UI command channel
const COMMAND_BUFFER: usize = 32;

/// What a ready session is rendering through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutput {
    /// Audio engine handle is loaded
    Audio,

    /// Video item; an external video surface owns playback
    VideoPassthrough,
}

/// Controller lifecycle
///
/// A failed load publishes the failure and falls back to `Idle`; see
/// [`AudioSessionController::failed_track_id`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No handle loaded
    #[default]
    Idle,

    /// Load in flight; the store shows buffering
    Loading { track_id: String },

    Ready {
        track_id: String,
        output: SessionOutput,
    },
}

impl SessionPhase {
    pub fn track_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading { track_id } | Self::Ready { track_id, .. } => Some(track_id),
        }
    }

    /// Output of a ready session
    pub fn output(&self) -> Option<SessionOutput> {
        match self {
            Self::Ready { output, .. } => Some(*output),
            _ => None,
        }
    }
}

/// Commands accepted by a spawned session
#[derive(Debug)]
pub enum SessionCommand {
    TogglePlay,
    SeekTo(Duration),
    SetRate(f32),
    PlayTrack(MediaItem),
    Stop,
    Shutdown { done: oneshot::Sender<()> },
}

/// Drives one audio engine from a [`SharedStore`]
pub struct AudioSessionController<E: AudioEngine> {
    engine: E,
    store: SharedStore,

    /// At most one live handle; `Some` exactly in `Ready { Audio }`
    handle: Option<E::Handle>,
    phase: SessionPhase,

    /// Track the engine state belongs to, independent of incidental store writes
    loaded_track_id: Option<String>,

    /// Track whose load failed; cleared on the next track change
    failed_track_id: Option<String>,

    /// Bumped whenever a handle is created or released
    generation: u64,

    guard: SyncGuard,

    /// Last intent / rate sent to (or confirmed by) the engine
    applied_intent: Option<bool>,
    applied_rate: Option<f32>,

    status_tx: mpsc::UnboundedSender<StatusReport>,
    status_rx: Option<mpsc::UnboundedReceiver<StatusReport>>,
}

impl<E: AudioEngine> AudioSessionController<E> {
    pub fn new(engine: E, store: SharedStore) -> Self {
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        Self {
            engine,
            store,
            handle: None,
            phase: SessionPhase::Idle,
            loaded_track_id: None,
            failed_track_id: None,
            generation: 0,
            guard: SyncGuard::Open,
            applied_intent: None,
            applied_rate: None,
            status_tx,
            status_rx: Some(status_rx),
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn loaded_track_id(&self) -> Option<&str> {
        self.loaded_track_id.as_deref()
    }

    /// Current track that could not be loaded
    ///
    /// The session is `Idle` while this is set, and the same track is not
    /// retried until the current track changes.
    pub fn failed_track_id(&self) -> Option<&str> {
        self.failed_track_id.as_deref()
    }

    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    pub fn guard(&self) -> SyncGuard {
        self.guard
    }

    /// Current load generation; reports tagged with any other value are dropped
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ===== Store -> engine =====

    /// Bring the engine in line with the store
    ///
    /// Handles a track change first, then rate, then play/pause intent.
    pub async fn sync_with_store(&mut self) {
        for _ in 0..MAX_SYNC_PASSES {
            let (track, intent, rate) = self.store.read(|store| {
                (
                    store.current_track().cloned(),
                    store.is_playing(),
                    store.playback_rate(),
                )
            });

            if track.as_ref().map(|t| t.id.as_str()) != self.loaded_track_id.as_deref() {
                self.apply_track(track).await;
                continue;
            }

            self.apply_rate(rate).await;
            self.apply_intent(intent).await;
            return;
        }

        warn!(passes = MAX_SYNC_PASSES, "Current track kept changing during sync");
    }

    async fn apply_track(&mut self, track: Option<MediaItem>) {
        self.release_handle().await;
        self.loaded_track_id = track.as_ref().map(|t| t.id.clone());
        self.failed_track_id = None;
        self.applied_intent = None;
        self.applied_rate = None;

        let Some(track) = track else {
            debug!("No current track, session idle");
            self.phase = SessionPhase::Idle;
            return;
        };

        if track.is_video() {
            debug!(track_id = %track.id, "Video item, playback left to the video surface");
            self.store.update(|store| store.set_is_buffering(false));
            self.phase = SessionPhase::Ready {
                track_id: track.id,
                output: SessionOutput::VideoPassthrough,
            };
            return;
        }

        if track.playable_url().is_empty() {
            self.load_failed(&track.id, &PlaybackError::Load("item has no media URL".to_string()));
            return;
        }

        self.phase = SessionPhase::Loading {
            track_id: track.id.clone(),
        };
        let (autoplay, rate, status_interval) = self.store.update(|store| {
            store.set_is_buffering(true);
            (
                store.is_playing(),
                store.playback_rate(),
                store.config().status_interval,
            )
        });

        self.generation += 1;
        let sink = StatusSink::new(self.generation, self.status_tx.clone());
        let options = LoadOptions {
            autoplay,
            rate,
            status_interval,
        };

        debug!(track_id = %track.id, url = %track.playable_url(), autoplay, rate, "Loading track");
        let result = self.engine.load(track.playable_url(), options, sink).await;

        // Loads are not cancelled; a result for a track that is no longer
        // current is released and ignored
        let superseded = self
            .store
            .read(|store| store.current_track_id() != Some(track.id.as_str()));
        if superseded {
            debug!(track_id = %track.id, "Current track changed during load, discarding result");
            if let Ok((mut handle, _)) = result {
                if let Err(e) = handle.unload().await {
                    warn!(track_id = %track.id, error = %e, "Failed to unload discarded source");
                }
            }
            self.generation += 1;
            self.loaded_track_id = None;
            self.phase = SessionPhase::Idle;
            self.store.update(|store| store.set_is_buffering(false));
            return;
        }

        match result {
            Ok((handle, status)) if status.is_loaded => {
                self.handle = Some(handle);
                self.applied_intent = Some(autoplay);
                self.applied_rate = Some(rate);
                self.store.update(|store| {
                    store.set_position(status.position);
                    store.set_duration(status.duration.unwrap_or_default());
                    store.set_is_buffering(false);
                });
                info!(
                    track_id = %track.id,
                    duration_ms = status.duration.map(|d| d.as_millis() as u64),
                    "Track loaded"
                );
                self.phase = SessionPhase::Ready {
                    track_id: track.id,
                    output: SessionOutput::Audio,
                };
            }
            Ok((mut handle, status)) => {
                if let Err(e) = handle.unload().await {
                    warn!(track_id = %track.id, error = %e, "Failed to unload unusable source");
                }
                let message = status
                    .error
                    .unwrap_or_else(|| "engine did not load the source".to_string());
                self.load_failed(&track.id, &PlaybackError::Load(message));
            }
            Err(e) => self.load_failed(&track.id, &e),
        }
    }

    fn load_failed(&mut self, track_id: &str, e: &PlaybackError) {
        error!(track_id = %track_id, error = %e, "Failed to load track");
        self.generation += 1;
        self.applied_intent = Some(false);
        self.store.update(|store| {
            store.set_is_playing(false);
            store.set_is_buffering(false);
        });
        self.failed_track_id = Some(track_id.to_string());
        self.phase = SessionPhase::Idle;
    }

    async fn apply_rate(&mut self, rate: f32) {
        if self.applied_rate == Some(rate) {
            return;
        }
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        self.applied_rate = Some(rate);
        if let Err(e) = handle.set_rate(rate).await {
            self.command_failed("set_rate", &e);
        }
    }

    async fn apply_intent(&mut self, intent: bool) {
        if self.guard.take_echo(intent) {
            trace!(intent, "Skipping echo of reconciled engine state");
            self.applied_intent = Some(intent);
            return;
        }
        if self.applied_intent == Some(intent) {
            return;
        }
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        self.applied_intent = Some(intent);
        match drive_to(handle, intent).await {
            Ok(true) => {
                debug!(playing = intent, "Engine commanded");
                self.guard.await_engine(intent);
            }
            Ok(false) => trace!(playing = intent, "Engine already matches intent"),
            Err(e) => self.engine_failed(if intent { "play" } else { "pause" }, &e),
        }
    }

    async fn release_handle(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            self.generation += 1;
            if let Err(e) = handle.unload().await {
                warn!(error = %e, "Failed to unload previous source");
            }
        }
        self.guard = SyncGuard::Open;
    }

    // ===== Engine -> store =====

    /// Apply one engine status report
    ///
    /// Reports from a replaced handle are dropped. Otherwise position,
    /// duration and buffering are published, and the store's play intent is
    /// reconciled to the engine when they disagree, unless the engine is
    /// buffering or has not yet caught up with our own command.
    pub async fn handle_status(&mut self, report: StatusReport) {
        if report.generation != self.generation || self.handle.is_none() {
            trace!(
                generation = report.generation,
                current = self.generation,
                "Dropping stale status report"
            );
            return;
        }

        let status = report.status;
        if !status.is_loaded {
            let message = status
                .error
                .unwrap_or_else(|| "source unloaded unexpectedly".to_string());
            self.engine_failed("status", &PlaybackError::command("status", message));
            return;
        }
        if let Some(message) = &status.error {
            warn!(error = %message, "Engine reported an error");
        }

        let awaiting = self.guard.expire().is_awaiting_engine();
        let reconciled = self.store.update(|store| {
            store.set_position(status.position);
            store.set_duration(status.duration.unwrap_or_default());
            store.set_is_buffering(status.is_buffering);

            let reconcile = !status.is_buffering
                && !status.did_finish
                && !awaiting
                && status.is_playing != store.is_playing();
            if reconcile {
                store.set_is_playing(status.is_playing);
            }
            reconcile
        });

        if reconciled {
            debug!(playing = status.is_playing, "Engine state changed externally, reconciling");
            self.guard.suppress_echo(status.is_playing);
        }

        if status.did_finish {
            self.finish_track().await;
        }
    }

    /// Apply every status report already queued
    pub async fn drain_status(&mut self) {
        let Some(mut rx) = self.status_rx.take() else {
            return;
        };
        while let Ok(report) = rx.try_recv() {
            self.handle_status(report).await;
        }
        self.status_rx = Some(rx);
    }

    async fn finish_track(&mut self) {
        let (auto_advance, repeat_mode) = self
            .store
            .read(|store| (store.config().auto_advance, store.repeat_mode()));
        info!(track_id = ?self.loaded_track_id, auto_advance, "Track finished");

        if auto_advance && repeat_mode == RepeatMode::One {
            self.store.update(|store| {
                store.set_position(Duration::ZERO);
                store.set_is_playing(true);
            });
            self.applied_intent = Some(true);
            self.rewind(true).await;
            return;
        }

        if auto_advance {
            let next = self.store.update(|store| {
                let next = store.play_next();
                if next.is_some() {
                    store.set_position(Duration::ZERO);
                    store.set_is_playing(true);
                }
                next
            });
            if let Some(next) = next {
                debug!(track_id = %next.id, "Advancing to next track");
                self.sync_with_store().await;
                return;
            }
        }

        self.store.update(|store| {
            store.set_is_playing(false);
            store.set_position(Duration::ZERO);
        });
        self.applied_intent = Some(false);
        self.rewind(false).await;
    }

    async fn rewind(&mut self, play: bool) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        if let Err(e) = rewind(handle, play).await {
            if play {
                self.engine_failed("play", &e);
            } else {
                self.command_failed("seek", &e);
            }
        }
    }

    // ===== Failure handling =====

    /// Downgrade to a paused, non-buffering state
    fn engine_failed(&mut self, command: &'static str, e: &PlaybackError) {
        warn!(command, error = %e, "Engine command failed");
        self.applied_intent = Some(false);
        self.guard = SyncGuard::Open;
        self.store.update(|store| {
            store.set_is_playing(false);
            store.set_is_buffering(false);
        });
    }

    /// Seek and rate failures leave the play intent alone
    fn command_failed(&mut self, command: &'static str, e: &PlaybackError) {
        warn!(command, error = %e, "Engine command failed");
        self.store.update(|store| store.set_is_buffering(false));
    }

    // ===== UI operations =====

    /// Flip play/pause based on what the engine is actually doing
    pub async fn toggle_play(&mut self) {
        match self.phase.output() {
            Some(SessionOutput::Audio) => {
                let Some(handle) = self.handle.as_mut() else {
                    return;
                };
                match toggle(handle).await {
                    Ok(Some(playing)) => {
                        self.applied_intent = Some(playing);
                        self.guard.await_engine(playing);
                        self.store.update(|store| store.set_is_playing(playing));
                    }
                    Ok(None) => debug!("Engine source not loaded, ignoring toggle"),
                    Err(e) => self.engine_failed("toggle_play", &e),
                }
            }
            Some(SessionOutput::VideoPassthrough) => {
                let playing = self.store.update(|store| {
                    let playing = !store.is_playing();
                    store.set_is_playing(playing);
                    playing
                });
                self.applied_intent = Some(playing);
            }
            None => debug!(phase = ?self.phase, "Nothing loaded, ignoring toggle"),
        }
    }

    pub async fn seek_to(&mut self, position: Duration) {
        let Some(handle) = self.handle.as_mut() else {
            debug!("Nothing loaded, ignoring seek");
            return;
        };
        match handle.seek(position).await {
            Ok(()) => self.store.update(|store| store.set_position(position)),
            Err(e) => self.command_failed("seek", &e),
        }
    }

    /// Store the rate and push it to a loaded engine
    pub async fn set_rate(&mut self, rate: f32) {
        let rate = self.store.update(|store| {
            store.set_playback_rate(rate);
            store.playback_rate()
        });
        self.apply_rate(rate).await;
    }

    /// Make `track` current and playing
    pub async fn play_track(&mut self, track: MediaItem) {
        self.store.update(|store| {
            store.set_current_track(Some(track));
            store.set_is_playing(true);
        });
        self.sync_with_store().await;
    }

    /// Clear the current track and release the engine
    pub async fn stop(&mut self) {
        self.store.update(|store| {
            store.set_is_playing(false);
            store.set_current_track(None);
            store.set_position(Duration::ZERO);
            store.set_duration(Duration::ZERO);
            store.set_is_buffering(false);
        });
        self.sync_with_store().await;
    }

    /// Release the engine, leaving the store untouched
    pub async fn shutdown(&mut self) {
        self.release_handle().await;
        self.loaded_track_id = None;
        self.failed_track_id = None;
        self.applied_intent = None;
        self.applied_rate = None;
        self.phase = SessionPhase::Idle;
        info!("Audio session shut down");
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        trace!(?command, "Session command");
        match command {
            SessionCommand::TogglePlay => self.toggle_play().await,
            SessionCommand::SeekTo(position) => self.seek_to(position).await,
            SessionCommand::SetRate(rate) => self.set_rate(rate).await,
            SessionCommand::PlayTrack(track) => self.play_track(track).await,
            SessionCommand::Stop => self.stop().await,
            SessionCommand::Shutdown { done } => {
                self.shutdown().await;
                let _ = done.send(());
            }
        }
    }

    // ===== Task =====

    /// Run until shut down or every [`SessionHandle`] is dropped
    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        let Some(mut status_rx) = self.status_rx.take() else {
            error!("Status receiver already taken, session cannot run");
            return;
        };
        let mut store_rx = self.store.subscribe();

        info!("Audio session started");
        self.sync_with_store().await;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command @ SessionCommand::Shutdown { .. }) => {
                        self.handle_command(command).await;
                        break;
                    }
                    Some(command) => self.handle_command(command).await,
                    None => {
                        self.shutdown().await;
                        break;
                    }
                },
                Some(report) = status_rx.recv() => self.handle_status(report).await,
                changed = store_rx.changed() => {
                    if changed.is_err() {
                        self.shutdown().await;
                        break;
                    }
                    self.sync_with_store().await;
                }
            }
        }
    }

    /// Spawn the session on the current tokio runtime
    pub fn spawn(self) -> (SessionHandle, JoinHandle<()>)
    where
        E: 'static,
        E::Handle: 'static,
    {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let session = SessionHandle {
            commands,
            store: self.store.clone(),
        };
        let task = tokio::spawn(self.run(rx));
        (session, task)
    }
}

/// Play/pause towards `playing` if the engine disagrees
async fn drive_to<H: EngineHandle>(handle: &mut H, playing: bool) -> Result<bool> {
    let status = handle.status().await?;
    if !status.is_loaded || status.is_playing == playing {
        return Ok(false);
    }
    if playing {
        handle.play().await?;
    } else {
        handle.pause().await?;
    }
    Ok(true)
}

/// Invert the engine's own playing flag; `None` if nothing is loaded
async fn toggle<H: EngineHandle>(handle: &mut H) -> Result<Option<bool>> {
    let status = handle.status().await?;
    if !status.is_loaded {
        return Ok(None);
    }
    if status.is_playing {
        handle.pause().await?;
    } else {
        handle.play().await?;
    }
    Ok(Some(!status.is_playing))
}

async fn rewind<H: EngineHandle>(handle: &mut H, play: bool) -> Result<()> {
    handle.seek(Duration::ZERO).await?;
    if play {
        handle.play().await?;
    }
    Ok(())
}

/// Cloneable front end of a spawned session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    store: SharedStore,
}

impl SessionHandle {
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::SessionClosed)
    }

    pub async fn toggle_play(&self) -> Result<()> {
        self.send(SessionCommand::TogglePlay).await
    }

    pub async fn seek_to(&self, position: Duration) -> Result<()> {
        self.send(SessionCommand::SeekTo(position)).await
    }

    pub async fn set_rate(&self, rate: f32) -> Result<()> {
        self.send(SessionCommand::SetRate(rate)).await
    }

    pub async fn play_track(&self, track: MediaItem) -> Result<()> {
        self.send(SessionCommand::PlayTrack(track)).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(SessionCommand::Stop).await
    }

    /// Release the engine and wait for the session task to finish
    pub async fn shutdown(&self) -> Result<()> {
        let (done, finished) = oneshot::channel();
        self.send(SessionCommand::Shutdown { done }).await?;
        finished.await.map_err(|_| PlaybackError::SessionClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_accessors() {
        assert_eq!(SessionPhase::Idle.track_id(), None);
        assert_eq!(SessionPhase::Idle.output(), None);

        let ready = SessionPhase::Ready {
            track_id: "t1".to_string(),
            output: SessionOutput::VideoPassthrough,
        };
        assert_eq!(ready.track_id(), Some("t1"));
        assert_eq!(ready.output(), Some(SessionOutput::VideoPassthrough));

        let loading = SessionPhase::Loading {
            track_id: "t2".to_string(),
        };
        assert_eq!(loading.track_id(), Some("t2"));
        assert_eq!(loading.output(), None);
    }
}

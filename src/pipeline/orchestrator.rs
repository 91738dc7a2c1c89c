use super::annotate::annotate;
use super::recognizer::{Recognition, Recognizer};
use super::types::{FatalErrorKind, FramePayload, PipelineMode, PipelineState};
use crate::actions::GestureActionMap;
use crate::camera::FrameSource;
use crate::config::PipelineConfig;
use crate::error::{GestureCamError, Result};
use crate::events::{EventBus, PipelineEvent};
use crate::frame::FrameData;
use crate::stats::StatsAggregator;
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Runtime switches shared between a running pipeline and its controller
#[derive(Debug, Clone)]
pub struct PipelineControls {
    face_recognition: Arc<AtomicBool>,
}

impl PipelineControls {
    pub fn new(face_recognition: bool) -> Self {
        Self {
            face_recognition: Arc::new(AtomicBool::new(face_recognition)),
        }
    }

    pub fn face_recognition(&self) -> bool {
        self.face_recognition.load(Ordering::SeqCst)
    }

    pub fn set_face_recognition(&self, enabled: bool) {
        self.face_recognition.store(enabled, Ordering::SeqCst);
    }

    /// Flip face recognition and return the new setting
    pub fn toggle_face_recognition(&self) -> bool {
        !self.face_recognition.fetch_xor(true, Ordering::SeqCst)
    }
}

impl Default for PipelineControls {
    fn default() -> Self {
        Self::new(false)
    }
}

enum TickOutcome {
    Processed,
    Missed,
    Restarted,
    Fatal(FatalErrorKind, GestureCamError),
}

/// Drives one pipeline mode: pulls frames, runs recognition, records stats
/// and publishes results, and owns the camera recovery policy
pub struct PipelineOrchestrator {
    pub(super) mode: PipelineMode,
    pub(super) config: PipelineConfig,
    pub(super) source: Arc<FrameSource>,
    pub(super) recognizer: Recognizer,
    pub(super) stats: StatsAggregator,
    pub(super) stats_persist_every: u64,
    pub(super) actions: GestureActionMap,
    pub(super) event_bus: EventBus,
    pub(super) controls: PipelineControls,
    pub(super) cancellation_token: CancellationToken,
    pub(super) state: PipelineState,
    pub(super) misses: u32,
    pub(super) restarted_this_streak: bool,
    pub(super) frames_processed: u64,
    pub(super) face_active: bool,
    pub(super) fatal_published: bool,
}

impl PipelineOrchestrator {
    /// Run until cancelled or a fatal condition. Fatal conditions are
    /// published once and returned as the error.
    pub async fn run(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(GestureCamError::component(
                "pipeline".to_string(),
                format!("{} pipeline has already stopped", self.mode),
            ));
        }

        info!("Starting {} pipeline", self.mode);
        self.set_state(PipelineState::Starting).await;

        let token = self.cancellation_token.clone();
        let cancelled = tokio::select! {
            _ = token.cancelled() => true,
            _ = tokio::time::sleep(self.config.startup_delay()) => false,
        };
        if cancelled {
            self.finish().await;
            return Ok(());
        }

        if !self.source.is_running() {
            if let Err(e) = self
                .source
                .start_with_retry(self.config.start_attempts, self.config.start_backoff())
                .await
            {
                return self.fail(FatalErrorKind::DeviceUnavailable, e).await;
            }
        }

        self.set_state(PipelineState::Running).await;

        let mut ticker = tokio::time::interval(self.config.tick_interval(self.mode));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if token.is_cancelled() {
                break;
            }

            match self.tick().await {
                TickOutcome::Processed => {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => {}
                    }
                }
                TickOutcome::Missed => {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep(self.config.miss_backoff()) => {}
                    }
                }
                TickOutcome::Restarted => {}
                TickOutcome::Fatal(kind, error) => return self.fail(kind, error).await,
            }
        }

        info!(
            "{} pipeline cancelled after {} frames",
            self.mode, self.frames_processed
        );
        self.finish().await;
        Ok(())
    }

    async fn tick(&mut self) -> TickOutcome {
        if !self.source.is_running() {
            warn!("Frame source is not running, attempting restart");
            if let Err(e) = self.source.start().await {
                error!("Frame source restart failed: {}", e);
                return TickOutcome::Fatal(FatalErrorKind::CameraStopped, e);
            }
            self.recognizer.reset();
            info!("Frame source restarted");
        }

        let Some(frame) = self.source.get_frame() else {
            return self.handle_miss().await;
        };

        self.misses = 0;
        self.restarted_this_streak = false;
        self.set_state(PipelineState::Running).await;
        self.process(frame).await;
        TickOutcome::Processed
    }

    async fn handle_miss(&mut self) -> TickOutcome {
        self.misses += 1;
        self.set_state(PipelineState::Degraded).await;
        debug!("No frame available ({} consecutive misses)", self.misses);

        if self.misses > self.config.max_consecutive_misses {
            return TickOutcome::Fatal(
                FatalErrorKind::ConsecutiveFrameLoss,
                GestureCamError::ConsecutiveFrameLoss {
                    misses: self.misses,
                },
            );
        }

        // One forced restart per streak of misses
        if self.misses == self.config.restart_after_misses && !self.restarted_this_streak {
            self.restarted_this_streak = true;
            warn!(
                "{} consecutive misses, restarting the frame source",
                self.misses
            );

            if let Err(e) = self.source.stop().await {
                warn!("Failed to stop frame source: {}", e);
            }
            tokio::time::sleep(self.config.restart_settle()).await;

            match self.source.start().await {
                Ok(()) => {
                    self.recognizer.reset();
                    self.misses = 0;
                    info!("Frame source restarted after consecutive misses");
                    return TickOutcome::Restarted;
                }
                Err(e) => warn!("Frame source restart failed: {}", e),
            }
        }

        TickOutcome::Missed
    }

    async fn process(&mut self, frame: FrameData) {
        let detect_face = self.mode.supports_expressions() && self.controls.face_recognition();
        if detect_face != self.face_active {
            info!(
                "Face recognition {}",
                if detect_face { "enabled" } else { "disabled" }
            );
            if !detect_face {
                self.recognizer.reset_expressions();
            }
            self.face_active = detect_face;
        }

        let image = match frame.to_rgb_image() {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping unreadable frame {}: {}", frame.id, e);
                return;
            }
        };

        let recognition = self.recognizer.recognize(&image, detect_face);
        let gestures = recognition.gestures.gestures.clone();
        let expressions = recognition.expressions.clone();

        if self.mode.records_stats() {
            self.stats.record_gestures(&gestures);
            self.stats.record_expressions(&expressions);
        }

        let payload = FramePayload {
            mode: self.mode,
            direction_label: recognition.gestures.direction_label(),
            pointing_direction: recognition.gestures.pointing_vector(),
            actions: self.actions.actionable(&gestures),
            stats: self.mode.attaches_stats().then(|| self.stats.snapshot()),
            annotated_frame: self.render(frame, image, &recognition),
            gestures,
            expressions,
        };

        if payload.has_events() {
            debug!(
                "Frame {}: gestures {:?}, expressions {:?}",
                payload.frame_id(),
                payload.gestures,
                payload.expressions
            );
        }

        self.frames_processed += 1;
        self.publish(PipelineEvent::Frame(Box::new(payload))).await;

        let persist_every = self.stats_persist_every;
        if self.mode.records_stats() && persist_every > 0 && self.frames_processed % persist_every == 0
        {
            self.persist_stats().await;
        }

        let log_every = self.config.progress_log_every;
        if log_every > 0 && self.frames_processed % log_every == 0 {
            info!(
                "{} pipeline processed {} frames",
                self.mode, self.frames_processed
            );
        }
    }

    /// Annotated or resized copy of the frame; the raw frame when neither applies
    fn render(&self, frame: FrameData, mut image: RgbImage, recognition: &Recognition) -> FrameData {
        let annotated = self.config.annotate && !recognition.failed;
        let preview = self.mode == PipelineMode::Game;
        if !annotated && !preview {
            return frame;
        }

        if annotated {
            annotate(&mut image, recognition);
        }
        if preview {
            let (width, height) = self.config.game_preview_size;
            image = imageops::resize(&image, width, height, FilterType::Triangle);
        }

        let mut rendered = FrameData::from_rgb_image(frame.id, image);
        rendered.timestamp = frame.timestamp;
        rendered
    }

    async fn persist_stats(&self) {
        match self.stats.persist().await {
            Ok(path) => {
                debug!("Saved stats to {}", path.display());
                self.publish(PipelineEvent::StatsPersisted {
                    mode: self.mode,
                    path,
                })
                .await;
            }
            Err(e) => warn!("Failed to save stats: {}", e),
        }
    }

    async fn publish(&self, event: PipelineEvent) {
        if let Err(e) = self.event_bus.publish(event).await {
            trace!("Pipeline event dropped: {}", e);
        }
    }

    async fn set_state(&mut self, state: PipelineState) {
        if self.state == state {
            return;
        }

        debug!("{} pipeline: {} -> {}", self.mode, self.state, state);
        self.state = state;
        self.publish(PipelineEvent::StateChanged {
            mode: self.mode,
            state,
            timestamp: SystemTime::now(),
        })
        .await;
    }

    async fn fail(&mut self, kind: FatalErrorKind, error: GestureCamError) -> Result<()> {
        error!("{} pipeline stopping on {}: {}", self.mode, kind, error);
        if !self.fatal_published {
            self.fatal_published = true;
            self.publish(PipelineEvent::Fatal {
                mode: self.mode,
                kind,
                message: error.to_string(),
            })
            .await;
        }

        self.finish().await;
        Err(error)
    }

    /// Save stats and enter the terminal state. The frame source stays as is.
    async fn finish(&mut self) {
        if self.mode.records_stats() && self.frames_processed > 0 {
            self.persist_stats().await;
        }
        self.set_state(PipelineState::Stopped).await;
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn controls(&self) -> PipelineControls {
        self.controls.clone()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn consecutive_misses(&self) -> u32 {
        self.misses
    }

    pub fn detector_failures(&self) -> u64 {
        self.recognizer.failures()
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }
}

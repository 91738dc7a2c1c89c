use super::orchestrator::{PipelineControls, PipelineOrchestrator};
use super::recognizer::Recognizer;
use super::types::{PipelineMode, PipelineState};
use crate::camera::FrameSource;
use crate::config::GestureCamConfig;
use crate::error::{GestureCamError, Result};
use crate::events::EventBus;
use crate::landmarks::{LandmarkDetector, NullDetector};
use crate::stats::StatsAggregator;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builder for a pipeline orchestrator
pub struct PipelineBuilder {
    mode: PipelineMode,
    config: Option<GestureCamConfig>,
    source: Option<Arc<FrameSource>>,
    hand_detector: Option<Box<dyn LandmarkDetector>>,
    face_detector: Option<Box<dyn LandmarkDetector>>,
    stats: Option<StatsAggregator>,
    event_bus: Option<EventBus>,
    controls: Option<PipelineControls>,
    cancellation_token: Option<CancellationToken>,
}

impl PipelineBuilder {
    pub fn new(mode: PipelineMode) -> Self {
        Self {
            mode,
            config: None,
            source: None,
            hand_detector: None,
            face_detector: None,
            stats: None,
            event_bus: None,
            controls: None,
            cancellation_token: None,
        }
    }

    pub fn config(mut self, config: GestureCamConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn source(mut self, source: Arc<FrameSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn hand_detector(mut self, detector: Box<dyn LandmarkDetector>) -> Self {
        self.hand_detector = Some(detector);
        self
    }

    /// Face detector for live view; other modes never call it
    pub fn face_detector(mut self, detector: Box<dyn LandmarkDetector>) -> Self {
        self.face_detector = Some(detector);
        self
    }

    /// Share an aggregator with other pipelines; a JSON-backed one is created otherwise
    pub fn stats(mut self, stats: StatsAggregator) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn controls(mut self, controls: PipelineControls) -> Self {
        self.controls = Some(controls);
        self
    }

    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn build(self) -> Result<PipelineOrchestrator> {
        let config = self
            .config
            .ok_or_else(|| GestureCamError::system("Pipeline configuration must be specified"))?;
        let source = self
            .source
            .ok_or_else(|| GestureCamError::system("Frame source must be specified"))?;
        let hand_detector = self
            .hand_detector
            .ok_or_else(|| GestureCamError::system("Hand detector must be specified"))?;
        let event_bus = self
            .event_bus
            .ok_or_else(|| GestureCamError::system("Event bus must be specified"))?;

        let face_detector = self
            .face_detector
            .unwrap_or_else(|| Box::new(NullDetector) as Box<dyn LandmarkDetector>);
        let stats = self
            .stats
            .unwrap_or_else(|| StatsAggregator::with_json_store(&config.stats));
        let controls = self
            .controls
            .unwrap_or_else(|| PipelineControls::new(config.pipeline.face_recognition));

        let recognizer = Recognizer::new(
            hand_detector,
            face_detector,
            config.gesture.clone(),
            config.expression.clone(),
        );

        Ok(PipelineOrchestrator {
            mode: self.mode,
            config: config.pipeline.clone(),
            source,
            recognizer,
            stats,
            stats_persist_every: config.stats.persist_every_frames,
            actions: config.actions.clone(),
            event_bus,
            controls,
            cancellation_token: self.cancellation_token.unwrap_or_else(CancellationToken::new),
            state: PipelineState::Idle,
            misses: 0,
            restarted_this_streak: false,
            frames_processed: 0,
            face_active: false,
            fatal_published: false,
        })
    }
}

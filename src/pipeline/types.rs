use crate::actions::ActionDescriptor;
use crate::expression::ExpressionKind;
use crate::frame::FrameData;
use crate::gesture::{DirectionLabel, GestureKind};
use crate::stats::StatsReport;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which consumer the pipeline feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    /// Gestures, optional expressions, stats recorded and attached to each payload
    LiveView,
    /// Gestures and direction only, paced at the game frame rate
    Game,
    /// Gestures and direction with stats recorded
    Drawing,
}

impl PipelineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineMode::LiveView => "live_view",
            PipelineMode::Game => "game",
            PipelineMode::Drawing => "drawing",
        }
    }

    pub fn records_stats(&self) -> bool {
        !matches!(self, PipelineMode::Game)
    }

    pub fn attaches_stats(&self) -> bool {
        matches!(self, PipelineMode::LiveView)
    }

    /// Expression detection only runs in live view, and only when face
    /// recognition is switched on
    pub fn supports_expressions(&self) -> bool {
        matches!(self, PipelineMode::LiveView)
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one orchestrator run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Starting,
    Running,
    /// Frames are missing; recovery in progress
    Degraded,
    Stopped,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Starting => "starting",
            PipelineState::Running => "running",
            PipelineState::Degraded => "degraded",
            PipelineState::Stopped => "stopped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Stopped)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conditions that end a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalErrorKind {
    DeviceUnavailable,
    CameraStopped,
    ConsecutiveFrameLoss,
}

impl FatalErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FatalErrorKind::DeviceUnavailable => "device_unavailable",
            FatalErrorKind::CameraStopped => "camera_stopped",
            FatalErrorKind::ConsecutiveFrameLoss => "consecutive_frame_loss",
        }
    }
}

impl fmt::Display for FatalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything published for one processed frame
#[derive(Debug, Clone)]
pub struct FramePayload {
    pub mode: PipelineMode,
    /// Frame with landmarks drawn on it, or the raw frame when annotation is
    /// off or recognition failed. Game mode delivers the resized preview.
    pub annotated_frame: FrameData,
    pub gestures: Vec<GestureKind>,
    pub expressions: Vec<ExpressionKind>,
    pub direction_label: Option<DirectionLabel>,
    pub pointing_direction: Option<(f32, f32)>,
    /// Action descriptors bound to this tick's gestures
    pub actions: Vec<(GestureKind, ActionDescriptor)>,
    pub stats: Option<StatsReport>,
}

impl FramePayload {
    pub fn frame_id(&self) -> u64 {
        self.annotated_frame.id
    }

    pub fn has_events(&self) -> bool {
        !self.gestures.is_empty() || !self.expressions.is_empty()
    }
}

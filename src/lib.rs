pub mod actions;
pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod expression;
pub mod frame;
pub mod frame_slot;
pub mod gesture;
pub mod landmarks;
pub mod pipeline;
pub mod stats;

pub use actions::{ActionDescriptor, ActionKind, GestureActionMap};
pub use camera::{CaptureDevice, DeviceProvider, FrameSource, FrameSourceBuilder, SyntheticCamera};
pub use config::GestureCamConfig;
pub use error::{CameraError, DetectorError, GestureCamError, Result, StatsError};
pub use events::{EventBus, EventFilter, EventReceiver, PipelineEvent};
pub use expression::{ExpressionDetector, ExpressionKind};
pub use frame::{FrameData, FrameFormat};
pub use frame_slot::FrameSlot;
pub use gesture::{DirectionLabel, GestureClassifier, GestureKind, GestureResult};
pub use landmarks::{
    DetectionResult, FaceObservation, HandObservation, LandmarkDetector, ScriptedDetector,
};
pub use pipeline::{
    FatalErrorKind, FramePayload, PipelineBuilder, PipelineControls, PipelineMode,
    PipelineOrchestrator, PipelineState,
};
pub use stats::{StatsAggregator, StatsReport, StatsStore};

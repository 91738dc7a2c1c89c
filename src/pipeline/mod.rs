mod annotate;
mod builder;
mod orchestrator;
mod recognizer;
mod types;

pub use annotate::annotate;
pub use builder::PipelineBuilder;
pub use orchestrator::{PipelineControls, PipelineOrchestrator};
pub use recognizer::{Recognition, Recognizer};
pub use types::{FatalErrorKind, FramePayload, PipelineMode, PipelineState};

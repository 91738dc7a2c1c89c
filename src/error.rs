use thiserror::Error;

#[derive(Error, Debug)]
pub enum GestureCamError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    #[error("Stats error: {0}")]
    Stats(#[from] StatsError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("Lost {misses} consecutive frames")]
    ConsecutiveFrameLoss { misses: u32 },

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl GestureCamError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Capture device failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("No usable camera device (probed indices {indices:?})")]
    DeviceUnavailable { indices: Vec<u32> },

    #[error("Failed to open camera device {index}: {details}")]
    DeviceOpen { index: u32, details: String },

    #[error("Frame read failed: {details}")]
    FrameReadFailure { details: String },

    #[error("Camera configuration error: {details}")]
    Configuration { details: String },
}

/// Landmark detector failures, recovered by the pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("Landmark detection failed: {details}")]
    Inference { details: String },

    #[error("Malformed {modality} observation: {details}")]
    MalformedObservation {
        modality: &'static str,
        details: String,
    },
}

/// Statistics persistence failures
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Failed to write stats to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode stats report: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },

    #[error("Receiver lagged behind by {skipped} events")]
    Lagged { skipped: u64 },

    #[error("Event bus channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, GestureCamError>;

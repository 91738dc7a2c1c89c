mod builder;
mod device;
mod source;

pub use builder::FrameSourceBuilder;
pub use device::{CaptureDevice, DeviceBehavior, DeviceProvider, SyntheticCamera, SyntheticControl};
pub use source::FrameSource;

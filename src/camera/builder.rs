use super::device::DeviceProvider;
use super::source::FrameSource;
use crate::config::CameraConfig;
use crate::error::{GestureCamError, Result};
use crate::frame_slot::FrameSlot;
use std::sync::Arc;

/// Builder for the camera frame source
pub struct FrameSourceBuilder {
    config: Option<CameraConfig>,
    provider: Option<Arc<dyn DeviceProvider>>,
    slot: Option<Arc<FrameSlot>>,
}

impl FrameSourceBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            provider: None,
            slot: None,
        }
    }

    pub fn config(mut self, config: CameraConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn DeviceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Share an existing slot instead of creating one
    pub fn slot(mut self, slot: Arc<FrameSlot>) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn build(self) -> Result<FrameSource> {
        let config = self
            .config
            .ok_or_else(|| GestureCamError::system("Camera configuration must be specified"))?;
        let provider = self
            .provider
            .ok_or_else(|| GestureCamError::system("Capture device provider must be specified"))?;

        if config.probe_indices.is_empty() {
            return Err(GestureCamError::system(
                "At least one camera index must be probed",
            ));
        }

        let slot = self.slot.unwrap_or_else(|| Arc::new(FrameSlot::new()));
        Ok(FrameSource::with_slot(config, provider, slot))
    }
}

impl Default for FrameSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

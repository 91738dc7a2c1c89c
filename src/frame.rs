use crate::error::{GestureCamError, Result};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;

/// Pixel layout of raw frame bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameFormat {
    /// 8-bit RGB, row-major
    Rgb24,
    /// 8-bit luminance, row-major
    Gray8,
}

impl FrameFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FrameFormat::Rgb24 => 3,
            FrameFormat::Gray8 => 1,
        }
    }
}

/// Frame data structure containing raw frame data and metadata
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Unique frame identifier
    pub id: u64,
    /// Timestamp when frame was captured
    pub timestamp: SystemTime,
    /// Raw frame data (shared ownership for efficiency)
    pub data: Arc<Vec<u8>>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frame format
    pub format: FrameFormat,
}

impl FrameData {
    pub fn new(
        id: u64,
        timestamp: SystemTime,
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: FrameFormat,
    ) -> Self {
        Self {
            id,
            timestamp,
            data: Arc::new(data),
            width,
            height,
            format,
        }
    }

    pub fn from_rgb_image(id: u64, image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(
            id,
            SystemTime::now(),
            image.into_raw(),
            width,
            height,
            FrameFormat::Rgb24,
        )
    }

    pub fn expected_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    pub fn validate_size(&self) -> bool {
        self.data.len() == self.expected_size()
    }

    /// Get frame age in milliseconds
    pub fn age_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.timestamp)
            .unwrap_or_default()
            .as_millis() as u64
    }

    /// RGB view of the frame for detectors and annotation
    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        if !self.validate_size() {
            return Err(self.size_error());
        }

        match self.format {
            FrameFormat::Rgb24 => {
                RgbImage::from_raw(self.width, self.height, self.data.as_ref().clone())
                    .ok_or_else(|| self.size_error())
            }
            FrameFormat::Gray8 => {
                let gray = GrayImage::from_raw(self.width, self.height, self.data.as_ref().clone())
                    .ok_or_else(|| self.size_error())?;
                Ok(image::DynamicImage::ImageLuma8(gray).to_rgb8())
            }
        }
    }

    /// Copy of the frame flipped left to right, keeping id and timestamp
    pub fn mirrored(&self) -> Result<FrameData> {
        if !self.validate_size() {
            return Err(self.size_error());
        }

        let bpp = self.format.bytes_per_pixel();
        let row_len = self.width as usize * bpp;
        if row_len == 0 {
            return Ok(self.clone());
        }

        let mut flipped = Vec::with_capacity(self.data.len());
        for row in self.data.chunks_exact(row_len) {
            for pixel in row.chunks_exact(bpp).rev() {
                flipped.extend_from_slice(pixel);
            }
        }

        Ok(FrameData {
            data: Arc::new(flipped),
            ..self.clone()
        })
    }

    fn size_error(&self) -> GestureCamError {
        GestureCamError::component(
            "frame".to_string(),
            format!(
                "frame {} has {} bytes, expected {} for {}x{} {:?}",
                self.id,
                self.data.len(),
                self.expected_size(),
                self.width,
                self.height,
                self.format
            ),
        )
    }
}

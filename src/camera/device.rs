use crate::error::CameraError;
use crate::frame::{FrameData, FrameFormat};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, trace};

/// Blocking capture device handle, e.g. a V4L2 node
pub trait CaptureDevice: Send {
    fn set_resolution(&mut self, width: u32, height: u32);

    fn is_opened(&self) -> bool;

    /// Read the next frame, blocking until one is available
    fn read(&mut self) -> Result<FrameData, CameraError>;

    fn release(&mut self);
}

/// Opens capture devices by index
pub trait DeviceProvider: Send + Sync {
    fn open(&self, index: u32) -> Box<dyn CaptureDevice>;
}

/// How a synthetic device at a given index behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceBehavior {
    /// Opens and produces test pattern frames
    Working,
    /// Never reports opened
    Unavailable,
    /// Opens but every read fails
    NoFrames,
    /// Delivers one frame after opening, then every read fails
    Stalled,
}

/// Shared knobs and counters for synthetic devices
#[derive(Debug, Clone, Default)]
pub struct SyntheticControl {
    failing_reads: Arc<AtomicU32>,
    refused_opens: Arc<AtomicU32>,
    opens: Arc<Mutex<HashMap<u32, u32>>>,
    releases: Arc<AtomicU64>,
    frames: Arc<AtomicU64>,
}

impl SyntheticControl {
    /// Make the next `count` reads on any open device fail
    pub fn inject_read_failures(&self, count: u32) {
        self.failing_reads.fetch_add(count, Ordering::SeqCst);
    }

    /// Make the next `count` opens produce an unopened device
    pub fn refuse_next_opens(&self, count: u32) {
        self.refused_opens.fetch_add(count, Ordering::SeqCst);
    }

    pub fn open_count(&self, index: u32) -> u32 {
        self.opens.lock().get(&index).copied().unwrap_or(0)
    }

    pub fn release_count(&self) -> u64 {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn frames_produced(&self) -> u64 {
        self.frames.load(Ordering::SeqCst)
    }

    fn take_one(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Device provider producing moving test patterns; stands in for real hardware
pub struct SyntheticCamera {
    behaviors: HashMap<u32, DeviceBehavior>,
    default_behavior: DeviceBehavior,
    frame_interval: Duration,
    control: SyntheticControl,
}

impl SyntheticCamera {
    /// Every index works and frames arrive at `fps`
    pub fn new(fps: u32) -> Self {
        Self {
            behaviors: HashMap::new(),
            default_behavior: DeviceBehavior::Working,
            frame_interval: Duration::from_millis(1000 / fps.max(1) as u64),
            control: SyntheticControl::default(),
        }
    }

    pub fn with_behavior(mut self, index: u32, behavior: DeviceBehavior) -> Self {
        self.behaviors.insert(index, behavior);
        self
    }

    pub fn with_default_behavior(mut self, behavior: DeviceBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn control(&self) -> SyntheticControl {
        self.control.clone()
    }
}

impl DeviceProvider for SyntheticCamera {
    fn open(&self, index: u32) -> Box<dyn CaptureDevice> {
        *self.control.opens.lock().entry(index).or_insert(0) += 1;

        let behavior = if SyntheticControl::take_one(&self.control.refused_opens) {
            DeviceBehavior::Unavailable
        } else {
            self.behaviors
                .get(&index)
                .copied()
                .unwrap_or(self.default_behavior)
        };
        debug!("Opening synthetic camera {} ({:?})", index, behavior);

        Box::new(SyntheticDevice {
            index,
            behavior,
            opened: true,
            width: 640,
            height: 480,
            frame_interval: self.frame_interval,
            frame_number: 0,
            control: self.control.clone(),
        })
    }
}

struct SyntheticDevice {
    index: u32,
    behavior: DeviceBehavior,
    opened: bool,
    width: u32,
    height: u32,
    frame_interval: Duration,
    frame_number: u64,
    control: SyntheticControl,
}

impl SyntheticDevice {
    fn test_pattern(&self) -> Vec<u8> {
        let (w, h) = (self.width.max(1), self.height.max(1));
        let shift = (self.frame_number * 4) as u32;
        let mut data = Vec::with_capacity(w as usize * h as usize * 3);
        for y in 0..h {
            for x in 0..w {
                data.push(((x + y + shift) % 256) as u8);
                data.push((x * 255 / w) as u8);
                data.push((y * 255 / h) as u8);
            }
        }
        data
    }
}

impl CaptureDevice for SyntheticDevice {
    fn set_resolution(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn is_opened(&self) -> bool {
        self.opened && self.behavior != DeviceBehavior::Unavailable
    }

    fn read(&mut self) -> Result<FrameData, CameraError> {
        if !self.is_opened() {
            return Err(CameraError::FrameReadFailure {
                details: format!("synthetic camera {} is not open", self.index),
            });
        }

        if SyntheticControl::take_one(&self.control.failing_reads) {
            return Err(CameraError::FrameReadFailure {
                details: format!("injected read failure on camera {}", self.index),
            });
        }

        let stalled = self.behavior == DeviceBehavior::Stalled && self.frame_number > 0;
        if self.behavior == DeviceBehavior::NoFrames || stalled {
            return Err(CameraError::FrameReadFailure {
                details: format!("synthetic camera {} produced no frame", self.index),
            });
        }

        if !self.frame_interval.is_zero() {
            std::thread::sleep(self.frame_interval);
        }

        let frame = FrameData::new(
            self.frame_number,
            SystemTime::now(),
            self.test_pattern(),
            self.width.max(1),
            self.height.max(1),
            FrameFormat::Rgb24,
        );
        self.frame_number += 1;
        self.control.frames.fetch_add(1, Ordering::SeqCst);
        trace!("Synthetic camera {} produced frame {}", self.index, frame.id);

        Ok(frame)
    }

    fn release(&mut self) {
        if self.opened {
            self.opened = false;
            self.control.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

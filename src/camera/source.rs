use super::device::{CaptureDevice, DeviceProvider};
use crate::config::CameraConfig;
use crate::error::{CameraError, GestureCamError, Result};
use crate::frame::FrameData;
use crate::frame_slot::FrameSlot;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

type SharedDevice = Arc<Mutex<Option<Box<dyn CaptureDevice>>>>;

/// Background camera capture feeding a single-slot frame buffer
pub struct FrameSource {
    config: CameraConfig,
    provider: Arc<dyn DeviceProvider>,
    slot: Arc<FrameSlot>,
    device: SharedDevice,
    active_index: Arc<Mutex<Option<u32>>>,
    is_running: Arc<AtomicBool>,
    frame_counter: Arc<AtomicU64>,
    consecutive_errors: Arc<AtomicU32>,
    reinitializations: Arc<AtomicU64>,
    probe_attempts: Arc<AtomicU64>,
    cancel: Mutex<CancellationToken>,
    capture_task: Arc<tokio::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl FrameSource {
    pub fn new(config: CameraConfig, provider: Arc<dyn DeviceProvider>) -> Self {
        Self::with_slot(config, provider, Arc::new(FrameSlot::new()))
    }

    pub fn with_slot(
        config: CameraConfig,
        provider: Arc<dyn DeviceProvider>,
        slot: Arc<FrameSlot>,
    ) -> Self {
        info!(
            "Creating frame source (probe indices {:?}, {}x{} @ {}fps, mirror: {})",
            config.probe_indices, config.resolution.0, config.resolution.1, config.fps, config.mirror
        );

        Self {
            config,
            provider,
            slot,
            device: Arc::new(Mutex::new(None)),
            active_index: Arc::new(Mutex::new(None)),
            is_running: Arc::new(AtomicBool::new(false)),
            frame_counter: Arc::new(AtomicU64::new(0)),
            consecutive_errors: Arc::new(AtomicU32::new(0)),
            reinitializations: Arc::new(AtomicU64::new(0)),
            probe_attempts: Arc::new(AtomicU64::new(0)),
            cancel: Mutex::new(CancellationToken::new()),
            capture_task: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Probe the configured indices and start the capture loop on the first
    /// device that opens and delivers a test frame
    pub async fn start(&self) -> Result<()> {
        let mut task_guard = self.capture_task.lock().await;
        if self.is_running.load(Ordering::SeqCst) {
            warn!("Frame source is already running");
            return Ok(());
        }

        info!("Starting frame source");

        let provider = Arc::clone(&self.provider);
        let config = self.config.clone();
        let probe_attempts = Arc::clone(&self.probe_attempts);
        let (index, device) = tokio::task::spawn_blocking(move || {
            probe_devices(provider.as_ref(), &config, &probe_attempts)
        })
        .await
        .map_err(|e| CameraError::Configuration {
            details: format!("Device probe task failed: {}", e),
        })??;

        if let Some(mut previous) = self.device.lock().replace(device) {
            previous.release();
        }
        *self.active_index.lock() = Some(index);
        self.consecutive_errors.store(0, Ordering::SeqCst);

        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();
        self.is_running.store(true, Ordering::SeqCst);

        let capture_loop = CaptureLoop {
            config: self.config.clone(),
            provider: Arc::clone(&self.provider),
            slot: Arc::clone(&self.slot),
            device: Arc::clone(&self.device),
            active_index: Arc::clone(&self.active_index),
            frame_counter: Arc::clone(&self.frame_counter),
            consecutive_errors: Arc::clone(&self.consecutive_errors),
            reinitializations: Arc::clone(&self.reinitializations),
            token,
        };
        *task_guard = Some(tokio::task::spawn_blocking(move || capture_loop.run()));

        info!("Frame source started on camera {}", index);
        Ok(())
    }

    /// Stop the capture loop and release the device. The last frame stays
    /// readable.
    pub async fn stop(&self) -> Result<()> {
        let mut task_guard = self.capture_task.lock().await;
        if !self.is_running.swap(false, Ordering::SeqCst) {
            debug!("Frame source is not running");
            return Ok(());
        }

        info!("Stopping frame source");
        self.cancel.lock().cancel();

        let grace = self.config.stop_grace();
        if let Some(handle) = task_guard.take() {
            match tokio::time::timeout(grace, handle).await {
                Ok(Ok(())) => debug!("Capture loop exited"),
                Ok(Err(e)) => warn!("Capture loop ended abnormally: {}", e),
                Err(_) => warn!(
                    "Capture loop did not exit within {:?}, releasing device anyway",
                    grace
                ),
            }
        }

        let device = Arc::clone(&self.device);
        tokio::task::spawn_blocking(move || match device.try_lock_for(grace) {
            Some(mut guard) => {
                if let Some(mut device) = guard.take() {
                    device.release();
                }
            }
            None => warn!("Camera device is busy, could not release it"),
        })
        .await
        .map_err(|e| GestureCamError::component("camera".to_string(), e.to_string()))?;

        info!("Frame source stopped");
        Ok(())
    }

    pub async fn restart(&self) -> Result<()> {
        info!("Restarting frame source");
        self.stop().await?;
        self.start().await
    }

    /// Call `start` up to `attempts` times, sleeping `backoff` between failures
    pub async fn start_with_retry(&self, attempts: u32, backoff: Duration) -> Result<()> {
        let attempts = attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.start().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("Camera start attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| GestureCamError::system("Camera start was never attempted")))
    }

    /// Most recent frame, `None` until the first successful read
    pub fn get_frame(&self) -> Option<FrameData> {
        self.slot.latest()
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub fn slot(&self) -> Arc<FrameSlot> {
        Arc::clone(&self.slot)
    }

    pub fn active_index(&self) -> Option<u32> {
        *self.active_index.lock()
    }

    pub fn frames_captured(&self) -> u64 {
        self.frame_counter.load(Ordering::Relaxed)
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors.load(Ordering::SeqCst)
    }

    pub fn reinitializations(&self) -> u64 {
        self.reinitializations.load(Ordering::SeqCst)
    }

    /// Device opens attempted while probing, across all starts
    pub fn probe_attempts(&self) -> u64 {
        self.probe_attempts.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.cancel.lock().cancel();
    }
}

fn probe_devices(
    provider: &dyn DeviceProvider,
    config: &CameraConfig,
    attempts: &AtomicU64,
) -> std::result::Result<(u32, Box<dyn CaptureDevice>), CameraError> {
    let (width, height) = config.resolution;

    for &index in &config.probe_indices {
        attempts.fetch_add(1, Ordering::SeqCst);
        let mut device = provider.open(index);
        device.set_resolution(width, height);

        if !device.is_opened() {
            debug!("Camera {} did not open", index);
            device.release();
            continue;
        }

        match device.read() {
            Ok(frame) => {
                info!(
                    "Camera {} delivered a {}x{} test frame",
                    index, frame.width, frame.height
                );
                return Ok((index, device));
            }
            Err(e) => {
                warn!("Camera {} opened but failed its test read: {}", index, e);
                device.release();
            }
        }
    }

    error!("No camera device found at indices {:?}", config.probe_indices);
    Err(CameraError::DeviceUnavailable {
        indices: config.probe_indices.clone(),
    })
}

/// State moved onto the blocking capture thread
struct CaptureLoop {
    config: CameraConfig,
    provider: Arc<dyn DeviceProvider>,
    slot: Arc<FrameSlot>,
    device: SharedDevice,
    active_index: Arc<Mutex<Option<u32>>>,
    frame_counter: Arc<AtomicU64>,
    consecutive_errors: Arc<AtomicU32>,
    reinitializations: Arc<AtomicU64>,
    token: CancellationToken,
}

impl CaptureLoop {
    fn run(self) {
        debug!("Capture loop running");
        let max_failures = self.config.max_consecutive_read_failures.max(1);

        while !self.token.is_cancelled() {
            let read = match self.device.lock().as_mut() {
                Some(device) => device.read(),
                None => Err(CameraError::FrameReadFailure {
                    details: "no open device".to_string(),
                }),
            };

            match read.and_then(|frame| self.prepare(frame)) {
                Ok(frame) => {
                    self.consecutive_errors.store(0, Ordering::SeqCst);
                    self.slot.store(frame);
                }
                Err(e) => {
                    let failures = self.consecutive_errors.fetch_add(1, Ordering::SeqCst) + 1;
                    warn!("Frame read failed ({}/{}): {}", failures, max_failures, e);
                    if failures >= max_failures {
                        self.reopen(failures);
                    }
                    std::thread::sleep(self.config.read_retry_interval());
                }
            }
        }

        debug!("Capture loop finished");
    }

    fn prepare(&self, mut frame: FrameData) -> std::result::Result<FrameData, CameraError> {
        frame.id = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        if !self.config.mirror {
            return Ok(frame);
        }
        frame.mirrored().map_err(|e| CameraError::FrameReadFailure {
            details: e.to_string(),
        })
    }

    /// Release and reopen the active device
    fn reopen(&self, failures: u32) {
        let Some(index) = *self.active_index.lock() else {
            return;
        };
        warn!(
            "Reinitializing camera {} after {} consecutive read failures",
            index, failures
        );

        let mut guard = self.device.lock();
        if let Some(mut old) = guard.take() {
            old.release();
        }

        let (width, height) = self.config.resolution;
        let mut device = self.provider.open(index);
        device.set_resolution(width, height);

        if device.is_opened() && !self.token.is_cancelled() {
            *guard = Some(device);
            self.consecutive_errors.store(0, Ordering::SeqCst);
            self.reinitializations.fetch_add(1, Ordering::SeqCst);
            info!("Camera {} reopened", index);
        } else {
            device.release();
            drop(guard);
            error!("Failed to reopen camera {}", index);
            std::thread::sleep(self.config.reopen_backoff());
        }
    }
}

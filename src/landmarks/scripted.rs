use super::detector::{DetectionResult, LandmarkDetector};
use crate::error::DetectorError;
use image::RgbImage;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared counters for observing a detector after it has been boxed into a pipeline
#[derive(Debug, Clone, Default)]
pub struct DetectorProbe {
    calls: Arc<AtomicU64>,
    resets: Arc<AtomicU64>,
}

impl DetectorProbe {
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn resets(&self) -> u64 {
        self.resets.load(Ordering::Relaxed)
    }
}

/// Detector that replays a fixed sequence of results.
///
/// Once the script runs out it either starts over (`cycling`) or keeps
/// reporting empty detections.
pub struct ScriptedDetector {
    name: String,
    script: Vec<Result<DetectionResult, DetectorError>>,
    pending: VecDeque<usize>,
    cycle: bool,
    probe: DetectorProbe,
}

impl ScriptedDetector {
    pub fn new(name: &str, script: Vec<Result<DetectionResult, DetectorError>>) -> Self {
        let pending = (0..script.len()).collect();
        Self {
            name: name.to_string(),
            script,
            pending,
            cycle: false,
            probe: DetectorProbe::default(),
        }
    }

    /// Replays the script forever
    pub fn cycling(name: &str, script: Vec<Result<DetectionResult, DetectorError>>) -> Self {
        let mut detector = Self::new(name, script);
        detector.cycle = true;
        detector
    }

    /// Convenience for scripts without failures
    pub fn from_results(name: &str, results: Vec<DetectionResult>) -> Self {
        Self::new(name, results.into_iter().map(Ok).collect())
    }

    pub fn probe(&self) -> DetectorProbe {
        self.probe.clone()
    }
}

impl LandmarkDetector for ScriptedDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&mut self, _image: &RgbImage) -> Result<DetectionResult, DetectorError> {
        self.probe.calls.fetch_add(1, Ordering::Relaxed);

        if self.pending.is_empty() && self.cycle {
            self.pending.extend(0..self.script.len());
        }

        match self.pending.pop_front() {
            Some(step) => self.script[step].clone(),
            None => Ok(DetectionResult::empty()),
        }
    }

    fn reset(&mut self) {
        self.probe.resets.fetch_add(1, Ordering::Relaxed);
        debug!("Scripted detector '{}' reset", self.name);
    }
}

use crate::actions::GestureActionMap;
use crate::pipeline::PipelineMode;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GestureCamConfig {
    pub camera: CameraConfig,
    pub gesture: GestureConfig,
    pub expression: ExpressionConfig,
    pub stats: StatsConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
    pub system: SystemConfig,
    #[serde(default)]
    pub actions: GestureActionMap,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Device indices probed in order on start
    #[serde(default = "default_probe_indices")]
    pub probe_indices: Vec<u32>,

    /// Preferred capture resolution (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),

    /// Frames per second requested from the device
    #[serde(default = "default_camera_fps")]
    pub fps: u32,

    /// Mirror frames horizontally so the preview behaves like a mirror
    #[serde(default = "default_mirror")]
    pub mirror: bool,

    /// Consecutive read failures before the device is reopened
    #[serde(default = "default_max_read_failures")]
    pub max_consecutive_read_failures: u32,

    /// Pause after a failed read
    #[serde(default = "default_read_retry_interval_ms")]
    pub read_retry_interval_ms: u64,

    /// Pause after a failed reopen
    #[serde(default = "default_reopen_backoff_ms")]
    pub reopen_backoff_ms: u64,

    /// Time given to the capture loop to exit on stop
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GestureConfig {
    /// Minimum change in two-hand distance (normalized units) for a zoom event
    #[serde(default = "default_zoom_threshold")]
    pub zoom_threshold: f32,

    /// Ticks during which further zoom events are suppressed
    #[serde(default = "default_zoom_cooldown_ticks")]
    pub zoom_cooldown_ticks: u32,

    /// Ratio one axis must exceed the other by to count as a straight direction
    #[serde(default = "default_direction_dominance")]
    pub direction_dominance: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExpressionConfig {
    /// Eye aspect ratio below which an eye counts as closed
    #[serde(default = "default_eye_closed_ratio")]
    pub eye_closed_ratio: f32,

    /// Mouth aspect ratio above which the mouth counts as smiling
    #[serde(default = "default_smile_ratio")]
    pub smile_ratio: f32,

    /// Number of recent samples inspected for a blink
    #[serde(default = "default_blink_window")]
    pub blink_window: usize,

    /// Number of recent samples inspected for a smile
    #[serde(default = "default_smile_window")]
    pub smile_window: usize,

    /// Ticks during which a repeated blink or smile is suppressed
    #[serde(default = "default_expression_cooldown_ticks")]
    pub cooldown_ticks: u32,

    /// Samples retained per history buffer
    #[serde(default = "default_expression_history")]
    pub history_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatsConfig {
    /// Directory receiving persisted stats reports
    #[serde(default = "default_stats_path")]
    pub path: String,

    /// Window used for events-per-minute frequencies
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Timestamps retained per event kind
    #[serde(default = "default_stats_history")]
    pub history_capacity: usize,

    /// Persist stats every N published frames (0 disables)
    #[serde(default = "default_persist_every_frames")]
    pub persist_every_frames: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PipelineConfig {
    /// Mode the binary starts in
    #[serde(default = "default_mode")]
    pub mode: PipelineMode,

    /// Delay before the first camera start
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,

    /// Tick period for live view and drawing
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Tick rate for the game mode
    #[serde(default = "default_game_fps")]
    pub game_fps: u32,

    /// Preview size for the game mode camera view
    #[serde(default = "default_game_preview_size")]
    pub game_preview_size: (u32, u32),

    /// Pause after a tick without a frame
    #[serde(default = "default_miss_backoff_ms")]
    pub miss_backoff_ms: u64,

    /// Consecutive missing frames that force a camera restart
    #[serde(default = "default_restart_after_misses")]
    pub restart_after_misses: u32,

    /// Consecutive missing frames that end the run
    #[serde(default = "default_max_consecutive_misses")]
    pub max_consecutive_misses: u32,

    /// Pause between stop and start during a forced restart
    #[serde(default = "default_restart_settle_ms")]
    pub restart_settle_ms: u64,

    /// Camera start attempts
    #[serde(default = "default_start_attempts")]
    pub start_attempts: u32,

    /// Pause between camera start attempts
    #[serde(default = "default_start_backoff_ms")]
    pub start_backoff_ms: u64,

    /// Run the expression detector in live view
    #[serde(default = "default_face_recognition")]
    pub face_recognition: bool,

    /// Draw landmarks and markers on published frames
    #[serde(default = "default_annotate")]
    pub annotate: bool,

    /// Log progress every N published frames
    #[serde(default = "default_progress_log_every")]
    pub progress_log_every: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Directory for daily rolling log files (empty disables file logging)
    #[serde(default = "default_log_directory")]
    pub directory: String,

    /// File name prefix for log files
    #[serde(default = "default_log_prefix")]
    pub file_prefix: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl CameraConfig {
    pub fn read_retry_interval(&self) -> Duration {
        Duration::from_millis(self.read_retry_interval_ms)
    }

    pub fn reopen_backoff(&self) -> Duration {
        Duration::from_millis(self.reopen_backoff_ms)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}

impl StatsConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    pub fn directory(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

impl PipelineConfig {
    /// Tick period for the given mode
    pub fn tick_interval(&self, mode: PipelineMode) -> Duration {
        match mode {
            PipelineMode::Game => Duration::from_millis(1000 / self.game_fps.max(1) as u64),
            PipelineMode::LiveView | PipelineMode::Drawing => {
                Duration::from_millis(self.tick_interval_ms)
            }
        }
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn miss_backoff(&self) -> Duration {
        Duration::from_millis(self.miss_backoff_ms)
    }

    pub fn restart_settle(&self) -> Duration {
        Duration::from_millis(self.restart_settle_ms)
    }

    pub fn start_backoff(&self) -> Duration {
        Duration::from_millis(self.start_backoff_ms)
    }
}

impl GestureCamConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("gesturecam.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("camera.probe_indices", default_probe_indices())?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default("camera.fps", default_camera_fps())?
            .set_default("camera.mirror", default_mirror())?
            .set_default(
                "camera.max_consecutive_read_failures",
                default_max_read_failures(),
            )?
            .set_default(
                "camera.read_retry_interval_ms",
                default_read_retry_interval_ms(),
            )?
            .set_default("camera.reopen_backoff_ms", default_reopen_backoff_ms())?
            .set_default("camera.stop_grace_ms", default_stop_grace_ms())?
            .set_default("gesture.zoom_threshold", default_zoom_threshold() as f64)?
            .set_default("gesture.zoom_cooldown_ticks", default_zoom_cooldown_ticks())?
            .set_default(
                "gesture.direction_dominance",
                default_direction_dominance() as f64,
            )?
            .set_default(
                "expression.eye_closed_ratio",
                default_eye_closed_ratio() as f64,
            )?
            .set_default("expression.smile_ratio", default_smile_ratio() as f64)?
            .set_default("expression.blink_window", default_blink_window() as i64)?
            .set_default("expression.smile_window", default_smile_window() as i64)?
            .set_default(
                "expression.cooldown_ticks",
                default_expression_cooldown_ticks(),
            )?
            .set_default(
                "expression.history_capacity",
                default_expression_history() as i64,
            )?
            .set_default("stats.path", default_stats_path())?
            .set_default("stats.window_seconds", default_window_seconds())?
            .set_default("stats.history_capacity", default_stats_history() as i64)?
            .set_default(
                "stats.persist_every_frames",
                default_persist_every_frames(),
            )?
            .set_default("pipeline.mode", "live_view")?
            .set_default("pipeline.startup_delay_ms", default_startup_delay_ms())?
            .set_default("pipeline.tick_interval_ms", default_tick_interval_ms())?
            .set_default("pipeline.game_fps", default_game_fps())?
            .set_default(
                "pipeline.game_preview_size",
                vec![default_game_preview_size().0, default_game_preview_size().1],
            )?
            .set_default("pipeline.miss_backoff_ms", default_miss_backoff_ms())?
            .set_default(
                "pipeline.restart_after_misses",
                default_restart_after_misses(),
            )?
            .set_default(
                "pipeline.max_consecutive_misses",
                default_max_consecutive_misses(),
            )?
            .set_default("pipeline.restart_settle_ms", default_restart_settle_ms())?
            .set_default("pipeline.start_attempts", default_start_attempts())?
            .set_default("pipeline.start_backoff_ms", default_start_backoff_ms())?
            .set_default("pipeline.face_recognition", default_face_recognition())?
            .set_default("pipeline.annotate", default_annotate())?
            .set_default(
                "pipeline.progress_log_every",
                default_progress_log_every(),
            )?
            .set_default("logging.directory", default_log_directory())?
            .set_default("logging.file_prefix", default_log_prefix())?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // GESTURECAM_PIPELINE__FACE_RECOGNITION=true
            .add_source(
                Environment::with_prefix("GESTURECAM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: GestureCamConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.probe_indices.is_empty() {
            return Err(ConfigError::Message(
                "At least one camera index must be probed".to_string(),
            ));
        }

        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if self.camera.fps == 0 {
            return Err(ConfigError::Message(
                "Camera fps must be greater than 0".to_string(),
            ));
        }

        if self.camera.max_consecutive_read_failures == 0 {
            return Err(ConfigError::Message(
                "Camera max_consecutive_read_failures must be greater than 0".to_string(),
            ));
        }

        if self.gesture.zoom_threshold <= 0.0 {
            return Err(ConfigError::Message(
                "Gesture zoom_threshold must be positive".to_string(),
            ));
        }

        if self.gesture.direction_dominance < 1.0 {
            return Err(ConfigError::Message(
                "Gesture direction_dominance must be at least 1.0".to_string(),
            ));
        }

        if self.expression.blink_window < 2 || self.expression.smile_window < 2 {
            return Err(ConfigError::Message(
                "Expression windows must hold at least 2 samples".to_string(),
            ));
        }

        if self.expression.history_capacity < self.expression.blink_window
            || self.expression.history_capacity < self.expression.smile_window
        {
            return Err(ConfigError::Message(
                "Expression history_capacity must cover the blink and smile windows".to_string(),
            ));
        }

        if self.stats.window_seconds == 0 {
            return Err(ConfigError::Message(
                "Stats window_seconds must be greater than 0".to_string(),
            ));
        }

        if self.stats.history_capacity == 0 {
            return Err(ConfigError::Message(
                "Stats history_capacity must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.game_fps == 0 || self.pipeline.tick_interval_ms == 0 {
            return Err(ConfigError::Message(
                "Pipeline tick rates must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.start_attempts == 0 {
            return Err(ConfigError::Message(
                "Pipeline start_attempts must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.restart_after_misses == 0
            || self.pipeline.restart_after_misses > self.pipeline.max_consecutive_misses
        {
            return Err(ConfigError::Message(
                "Pipeline restart_after_misses must be in 1..=max_consecutive_misses".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for GestureCamConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            gesture: GestureConfig::default(),
            expression: ExpressionConfig::default(),
            stats: StatsConfig::default(),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig {
                directory: default_log_directory(),
                file_prefix: default_log_prefix(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
            actions: GestureActionMap::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            probe_indices: default_probe_indices(),
            resolution: default_camera_resolution(),
            fps: default_camera_fps(),
            mirror: default_mirror(),
            max_consecutive_read_failures: default_max_read_failures(),
            read_retry_interval_ms: default_read_retry_interval_ms(),
            reopen_backoff_ms: default_reopen_backoff_ms(),
            stop_grace_ms: default_stop_grace_ms(),
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            zoom_threshold: default_zoom_threshold(),
            zoom_cooldown_ticks: default_zoom_cooldown_ticks(),
            direction_dominance: default_direction_dominance(),
        }
    }
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            eye_closed_ratio: default_eye_closed_ratio(),
            smile_ratio: default_smile_ratio(),
            blink_window: default_blink_window(),
            smile_window: default_smile_window(),
            cooldown_ticks: default_expression_cooldown_ticks(),
            history_capacity: default_expression_history(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            path: default_stats_path(),
            window_seconds: default_window_seconds(),
            history_capacity: default_stats_history(),
            persist_every_frames: default_persist_every_frames(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            startup_delay_ms: default_startup_delay_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            game_fps: default_game_fps(),
            game_preview_size: default_game_preview_size(),
            miss_backoff_ms: default_miss_backoff_ms(),
            restart_after_misses: default_restart_after_misses(),
            max_consecutive_misses: default_max_consecutive_misses(),
            restart_settle_ms: default_restart_settle_ms(),
            start_attempts: default_start_attempts(),
            start_backoff_ms: default_start_backoff_ms(),
            face_recognition: default_face_recognition(),
            annotate: default_annotate(),
            progress_log_every: default_progress_log_every(),
        }
    }
}

// Default value functions
fn default_probe_indices() -> Vec<u32> {
    vec![0, 1, 2]
}
fn default_camera_resolution() -> (u32, u32) {
    (640, 480)
}
fn default_camera_fps() -> u32 {
    30
}
fn default_mirror() -> bool {
    true
}
fn default_max_read_failures() -> u32 {
    5
}
fn default_read_retry_interval_ms() -> u64 {
    100
}
fn default_reopen_backoff_ms() -> u64 {
    1000
}
fn default_stop_grace_ms() -> u64 {
    500
}

fn default_zoom_threshold() -> f32 {
    0.05
}
fn default_zoom_cooldown_ticks() -> u32 {
    10
}
fn default_direction_dominance() -> f32 {
    1.2
}

fn default_eye_closed_ratio() -> f32 {
    0.2
}
fn default_smile_ratio() -> f32 {
    3.5
}
fn default_blink_window() -> usize {
    3
}
fn default_smile_window() -> usize {
    5
}
fn default_expression_cooldown_ticks() -> u32 {
    15
}
fn default_expression_history() -> usize {
    10
}

fn default_stats_path() -> String {
    "stats".to_string()
}
fn default_window_seconds() -> u64 {
    60
}
fn default_stats_history() -> usize {
    100
}
fn default_persist_every_frames() -> u64 {
    100
}

fn default_mode() -> PipelineMode {
    PipelineMode::LiveView
}
fn default_startup_delay_ms() -> u64 {
    1000
}
fn default_tick_interval_ms() -> u64 {
    33
}
fn default_game_fps() -> u32 {
    10
}
fn default_game_preview_size() -> (u32, u32) {
    (320, 240)
}
fn default_miss_backoff_ms() -> u64 {
    100
}
fn default_restart_after_misses() -> u32 {
    5
}
fn default_max_consecutive_misses() -> u32 {
    10
}
fn default_restart_settle_ms() -> u64 {
    1000
}
fn default_start_attempts() -> u32 {
    3
}
fn default_start_backoff_ms() -> u64 {
    1000
}
fn default_face_recognition() -> bool {
    false
}
fn default_annotate() -> bool {
    true
}
fn default_progress_log_every() -> u64 {
    100
}

fn default_log_directory() -> String {
    "logs".to_string()
}
fn default_log_prefix() -> String {
    "gesturecam.log".to_string()
}

fn default_event_bus_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GestureCamConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.camera.probe_indices, vec![0, 1, 2]);
        assert_eq!(config.camera.resolution, (640, 480));
        assert_eq!(config.expression.cooldown_ticks, 15);
        assert_eq!(config.gesture.zoom_cooldown_ticks, 10);
        assert_eq!(config.stats.history_capacity, 100);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let config = GestureCamConfig::load_from_file("/nonexistent/gesturecam.toml").unwrap();

        assert_eq!(config.pipeline.mode, PipelineMode::LiveView);
        assert_eq!(config.pipeline.tick_interval_ms, 33);
        assert_eq!(config.stats.window_seconds, 60);
        assert!(!config.pipeline.face_recognition);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[camera]
probe_indices = [2]
resolution = [1280, 720]

[pipeline]
mode = "game"
face_recognition = true

[actions.peace]
action = "keyboard_shortcut"
params = {{ shortcut = "save" }}
description = "Save"
"#
        )
        .unwrap();

        let config = GestureCamConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.camera.probe_indices, vec![2]);
        assert_eq!(config.camera.resolution, (1280, 720));
        assert_eq!(config.camera.fps, 30);
        assert_eq!(config.pipeline.mode, PipelineMode::Game);
        assert!(config.pipeline.face_recognition);
        let peace = config.actions.resolve(crate::gesture::GestureKind::Peace);
        assert_eq!(peace.description, "Save");
        assert_eq!(
            peace.params.get("shortcut").map(String::as_str),
            Some("save")
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = GestureCamConfig::default();
        config.camera.resolution = (0, 0);
        assert!(config.validate().is_err());

        config.camera.resolution = (640, 480);
        assert!(config.validate().is_ok());

        config.camera.probe_indices.clear();
        assert!(config.validate().is_err());

        config.camera.probe_indices = vec![0];
        config.pipeline.restart_after_misses = 20;
        assert!(config.validate().is_err());

        config.pipeline.restart_after_misses = 5;
        config.expression.history_capacity = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tick_interval_per_mode() {
        let pipeline = PipelineConfig::default();

        assert_eq!(
            pipeline.tick_interval(PipelineMode::LiveView),
            Duration::from_millis(33)
        );
        assert_eq!(
            pipeline.tick_interval(PipelineMode::Game),
            Duration::from_millis(100)
        );
    }
}

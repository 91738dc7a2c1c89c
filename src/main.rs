use anyhow::Result;
use clap::{Parser, ValueEnum};
use gesturecam::config::LoggingConfig;
use gesturecam::error::EventBusError;
use gesturecam::landmarks::synthetic::{FacePose, HandPose};
use gesturecam::landmarks::{DetectionResult, ScriptedDetector};
use gesturecam::{
    DetectorError, EventBus, EventFilter, FrameSourceBuilder, GestureCamConfig, PipelineBuilder,
    PipelineEvent, PipelineMode, StatsAggregator, SyntheticCamera,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Live,
    Game,
    Drawing,
}

impl From<ModeArg> for PipelineMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Live => PipelineMode::LiveView,
            ModeArg::Game => PipelineMode::Game,
            ModeArg::Drawing => PipelineMode::Drawing,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "gesturecam")]
#[command(about = "Real-time hand gesture and facial expression recognition")]
#[command(version)]
#[command(long_about = "Runs the gesture and expression recognition pipeline against a camera \
feed, debounces blinks, smiles and zoom gestures, and keeps per-session recognition stats. \
This binary drives the pipeline with a synthetic camera and scripted landmark detectors.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "gesturecam.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting the pipeline")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Pipeline mode, overriding the configuration
    #[arg(long, value_enum, help = "Pipeline mode: live, game or drawing")]
    mode: Option<ModeArg>,

    /// Start with face recognition enabled
    #[arg(long, help = "Enable blink and smile detection in live view")]
    face: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    let mut config = match GestureCamConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", args.config, e);
            return Err(e.into());
        }
    };

    let _log_guard = init_logging(&args, &config.logging)?;

    info!("Starting gesturecam v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if args.validate_config {
        info!("Configuration validation successful");
        println!("✓ Configuration is valid");
        return Ok(());
    }

    if let Some(mode) = args.mode {
        config.pipeline.mode = mode.into();
    }
    if args.face {
        config.pipeline.face_recognition = true;
    }

    run(config).await
}

async fn run(config: GestureCamConfig) -> Result<()> {
    let mode = config.pipeline.mode;
    info!(
        "Running {} pipeline (face recognition: {})",
        mode, config.pipeline.face_recognition
    );

    let source = Arc::new(
        FrameSourceBuilder::new()
            .config(config.camera.clone())
            .provider(Arc::new(SyntheticCamera::new(config.camera.fps)))
            .build()?,
    );
    let event_bus = EventBus::new(config.system.event_bus_capacity);
    let stats = StatsAggregator::with_json_store(&config.stats);

    let mut orchestrator = PipelineBuilder::new(mode)
        .config(config.clone())
        .source(Arc::clone(&source))
        .hand_detector(Box::new(demo_hand_detector()))
        .face_detector(Box::new(demo_face_detector()))
        .stats(stats.clone())
        .event_bus(event_bus.clone())
        .build()?;

    let mut receiver = event_bus.receiver(
        EventFilter::EventTypes(vec!["frame", "stats_persisted"]),
        "console",
    );
    let listener = tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(PipelineEvent::Frame(payload)) => {
                    if payload.has_events() {
                        info!(
                            "Frame {}: gestures {:?}, expressions {:?}, direction {:?}",
                            payload.frame_id(),
                            payload.gestures,
                            payload.expressions,
                            payload.direction_label
                        );
                    }
                    for (gesture, action) in &payload.actions {
                        info!(
                            "{} triggers {:?} ({})",
                            gesture, action.action, action.description
                        );
                    }
                }
                Ok(event) => info!("{}", event.description()),
                Err(EventBusError::Lagged { skipped }) => {
                    debug!("Console listener skipped {} events", skipped)
                }
                Err(_) => break,
            }
        }
    });

    let shutdown = orchestrator.cancellation_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                shutdown.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let result = orchestrator.run().await;

    if let Err(e) = source.stop().await {
        warn!("Failed to stop frame source: {}", e);
    }
    listener.abort();

    let report = stats.snapshot();
    info!(
        "Session {}: {} gestures and {} expressions in {:.1} minutes",
        report.session_id,
        report.gestures.total(),
        report.expressions.total(),
        report.session_duration.minutes
    );

    result.map_err(|e| {
        error!("Pipeline stopped with error: {}", e);
        e.into()
    })
}

fn repeat(
    script: &mut Vec<std::result::Result<DetectionResult, DetectorError>>,
    result: DetectionResult,
    ticks: usize,
) {
    script.extend(std::iter::repeat(Ok(result)).take(ticks));
}

/// Cycles through every single-hand gesture, then pulls two hands apart and
/// back together
fn demo_hand_detector() -> ScriptedDetector {
    let one = |pose: HandPose| DetectionResult::with_lists(vec![pose.raw()]);
    let mut script = Vec::new();

    repeat(&mut script, one(HandPose::palm()), 30);
    repeat(&mut script, one(HandPose::fist()), 30);
    repeat(&mut script, one(HandPose::new([true, false, false, false, false])), 30);
    repeat(&mut script, one(HandPose::new([false, true, true, false, false])), 30);
    repeat(&mut script, one(HandPose::pointing(1.0, 0.0)), 30);
    repeat(&mut script, one(HandPose::pointing(-1.0, 1.0)), 30);
    repeat(&mut script, DetectionResult::empty(), 15);

    for step in (1..=10).chain((1..=10).rev()) {
        let offset = 0.03 * step as f32;
        let hands = DetectionResult::with_lists(vec![
            HandPose::palm().at(0.5 - offset, 0.5).raw(),
            HandPose::palm().at(0.5 + offset, 0.5).raw(),
        ]);
        repeat(&mut script, hands, 2);
    }
    repeat(&mut script, DetectionResult::empty(), 15);

    ScriptedDetector::cycling("demo-hands", script)
}

/// Neutral face with one blink and one sustained smile per cycle
fn demo_face_detector() -> ScriptedDetector {
    let face = |pose: FacePose| DetectionResult::with_lists(vec![pose.raw()]);
    let mut script = Vec::new();

    repeat(&mut script, face(FacePose::neutral()), 40);
    repeat(&mut script, face(FacePose::eyes_closed()), 3);
    repeat(&mut script, face(FacePose::neutral()), 20);
    repeat(&mut script, face(FacePose::smiling()), 20);
    repeat(&mut script, face(FacePose::neutral()), 20);

    ScriptedDetector::cycling("demo-faces", script)
}

fn init_logging(args: &Args, logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gesturecam={}", log_level)));

    let console_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    // One file per day, e.g. logs/gesturecam.log.2024-05-01
    let (file_layer, guard) = if logging.directory.is_empty() {
        (None, None)
    } else {
        let file_appender =
            tracing_appender::rolling::daily(&logging.directory, &logging.file_prefix);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        let layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(file_writer);
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(env_filter)
        .init();

    Ok(guard)
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# Gesturecam Configuration File");
    println!("# This is the default configuration with all available options");
    println!("# Every value can be overridden with GESTURECAM_<SECTION>__<KEY> variables");
    println!();

    let default_config = toml::to_string_pretty(&GestureCamConfig::default())?;
    println!("{}", default_config);
    Ok(())
}

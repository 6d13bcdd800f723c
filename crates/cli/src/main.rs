use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use pathcam_core::detection::domain::path_detector::PathDetector;
use pathcam_core::detection::infrastructure::contour_path_detector::ContourPathDetector;
use pathcam_core::detection::infrastructure::line_fit::DistanceKind;
use pathcam_core::guidance::domain::steering_policy::SteeringPolicy;
use pathcam_core::pipeline::monitor_session::{MonitorSession, Mode, SessionStatus, TickOutcome};
use pathcam_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use pathcam_core::shared::constants::{
    DEFAULT_DEAD_BAND, DEFAULT_TICK_INTERVAL_MS, IMAGE_EXTENSIONS, PATH_THRESHOLD,
};
use pathcam_core::video::domain::image_writer::ImageWriter;
use pathcam_core::video::domain::stream_source::{StreamError, StreamSource};
use pathcam_core::video::infrastructure::ffmpeg_stream_source::FfmpegStreamSource;
use pathcam_core::video::infrastructure::image_file_source::ImageFileSource;
use pathcam_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Headless camera-stream monitor with dark-path detection.
#[derive(Parser, Debug)]
#[command(name = "pathcam")]
struct Cli {
    /// Stream URL, capture device, video file, or still image.
    address: String,

    /// Display mode: view or path.
    #[arg(long, default_value = "path")]
    mode: String,

    /// Milliseconds between frame reads.
    #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    interval_ms: u64,

    /// Stop after this many frames have been read.
    #[arg(long)]
    frames: Option<usize>,

    /// Save every displayed frame into this directory.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log the drive command that would steer toward the path.
    #[arg(long)]
    guidance: bool,

    /// Centroid offset (fraction of half the frame width) tolerated before turning.
    #[arg(long, default_value_t = DEFAULT_DEAD_BAND)]
    dead_band: f64,

    /// Stop after this many consecutive failed reads.
    #[arg(long)]
    max_failures: Option<usize>,

    /// Gray level at or below which pixels count as path (0-255).
    #[arg(long, default_value_t = PATH_THRESHOLD)]
    threshold: u8,

    /// Line-fit distance: l2, l1, or huber.
    #[arg(long, default_value = "l2")]
    line_fit: String,

    /// Network read timeout in seconds for stream addresses.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let frames = monitor(&cli)?;
    log::info!("Monitoring finished after {frames} frames");
    Ok(())
}

/// Runs the tick loop until a stop condition is hit. Returns the number of
/// frames read.
fn monitor(cli: &Cli) -> Result<usize, Box<dyn std::error::Error>> {
    let mode = parse_mode(&cli.mode)?;
    let detector = build_detector(cli)?;
    let mut session = MonitorSession::new(open_source(cli), detector, mode)
        .with_logger(Box::new(StdoutPipelineLogger::default()));

    let status = session.start(&cli.address);
    if status != SessionStatus::Connected {
        return Err(status.to_string().into());
    }

    let writer: Box<dyn ImageWriter> = Box::new(ImageFileWriter::new());
    let policy = SteeringPolicy::new(cli.dead_band);
    let interval = Duration::from_millis(cli.interval_ms);
    let mut frames = 0;
    let mut consecutive_failures = 0;

    loop {
        let tick_start = Instant::now();
        let Some(outcome) = session.tick() else {
            break;
        };
        match outcome {
            TickOutcome::Frame { frame, detection } => {
                frames += 1;
                consecutive_failures = 0;
                log::debug!("Frame {}: {}", frame.index(), session.status());

                if let Some(dir) = &cli.output {
                    let path = writer.write(dir, &frame)?;
                    log::debug!("Saved {}", path.display());
                }
                if let (true, Some(detection)) = (cli.guidance, &detection) {
                    let command = policy.command(detection, frame.width());
                    log::info!(
                        "Frame {}: {} -> {}",
                        frame.index(),
                        command,
                        String::from_utf8_lossy(&command.encode())
                    );
                }
                if cli.frames.is_some_and(|limit| frames >= limit) {
                    break;
                }
            }
            TickOutcome::ReadFailed(StreamError::EndOfStream) => {
                log::info!("End of stream");
                break;
            }
            TickOutcome::ReadFailed(e) => {
                consecutive_failures += 1;
                log::warn!("{}: {e}", session.status());
                if cli
                    .max_failures
                    .is_some_and(|limit| consecutive_failures >= limit)
                {
                    break;
                }
            }
        }
        if let Some(rest) = interval.checked_sub(tick_start.elapsed()) {
            thread::sleep(rest);
        }
    }

    session.stop();
    session.logger().summary();
    Ok(frames)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    parse_mode(&cli.mode)?;
    parse_line_fit(&cli.line_fit)?;
    if !(0.0..=1.0).contains(&cli.dead_band) {
        return Err(format!(
            "Dead band must be between 0.0 and 1.0, got {}",
            cli.dead_band
        )
        .into());
    }
    if cli.interval_ms == 0 {
        return Err("Interval must be at least 1 ms".into());
    }
    if cli.frames == Some(0) {
        return Err("--frames must be at least 1".into());
    }
    if cli.max_failures == Some(0) {
        return Err("--max-failures must be at least 1".into());
    }
    if cli.guidance && cli.mode == "view" {
        return Err("--guidance requires path mode".into());
    }
    if is_image(&cli.address) && !Path::new(cli.address.trim()).exists() {
        return Err(format!("Image file not found: {}", cli.address.trim()).into());
    }
    Ok(())
}

fn parse_mode(mode: &str) -> Result<Mode, Box<dyn std::error::Error>> {
    match mode {
        "view" => Ok(Mode::View),
        "path" => Ok(Mode::Path),
        other => Err(format!("Mode must be 'view' or 'path', got '{other}'").into()),
    }
}

fn parse_line_fit(kind: &str) -> Result<DistanceKind, Box<dyn std::error::Error>> {
    match kind {
        "l2" => Ok(DistanceKind::L2),
        "l1" => Ok(DistanceKind::L1),
        "huber" => Ok(DistanceKind::Huber),
        other => Err(format!("Line fit must be one of: l2, l1, huber, got '{other}'").into()),
    }
}

fn build_detector(cli: &Cli) -> Result<Box<dyn PathDetector>, Box<dyn std::error::Error>> {
    let detector = ContourPathDetector::default()
        .with_threshold(cli.threshold)
        .with_distance(parse_line_fit(&cli.line_fit)?);
    Ok(Box::new(detector))
}

fn is_image(address: &str) -> bool {
    Path::new(address.trim())
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn open_source(cli: &Cli) -> Box<dyn StreamSource> {
    if is_image(&cli.address) {
        return Box::new(ImageFileSource::new());
    }
    match cli.timeout_secs {
        Some(secs) => Box::new(FfmpegStreamSource::new().with_timeout(Duration::from_secs(secs))),
        None => Box::new(FfmpegStreamSource::new()),
    }
}

//! qrtrackd - QR marker pose tracking daemon
//!
//! This daemon:
//! 1. Ingests frames from the configured camera stream (ESP32-CAM or stub)
//! 2. Runs the configured marker detector on each frame
//! 3. Normalizes detections into pose records (ordered corners + centroid)
//! 4. Emits each pose to the registered consumers (telemetry on stdout)
//! 5. Stops on ctrl-c or permanent stream failure

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::{anyhow, Result};
use clap::Parser;

use qrtrack::track::StopReason;
use qrtrack::{create_detector, open_source, TelemetryWriter, TrackerConfig, TrackingLoop};

#[derive(Parser)]
#[command(name = "qrtrackd", about = "QR marker pose tracking daemon")]
struct Args {
    /// Path to the JSON config file.
    #[arg(long, env = "QRTRACK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the camera stream URL.
    #[arg(long)]
    url: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = TrackerConfig::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        cfg.stream.url = url;
    }

    let mut source = open_source(&cfg.stream)?;
    source.connect()?;

    let mut detector = create_detector(&cfg.detector)?;
    detector.warm_up()?;

    let mut tracking = TrackingLoop::new(source, detector);
    tracking.add_consumer(Box::new(TelemetryWriter::stdout()));

    let shutdown = tracking.shutdown_handle();
    ctrlc::set_handler(move || shutdown.store(true, Ordering::SeqCst))
        .map_err(|e| anyhow!("install ctrl-c handler: {}", e))?;

    log::info!(
        "qrtrackd running. stream={} target_fps={} detector={}",
        cfg.stream.url,
        cfg.stream.target_fps,
        cfg.detector
    );

    let report = tracking.run();
    log::info!(
        "stopped: frames={} pending={} poses={} malformed={}",
        report.frames_seen,
        report.pending_ticks,
        report.poses_emitted,
        report.malformed_detections
    );

    match report.stop_reason {
        StopReason::ShutdownRequested => Ok(()),
        StopReason::SourceFailed(reason) => Err(anyhow!("stream failed: {}", reason)),
    }
}

//! Per-frame tracking loop.
//!
//! The loop owns the frame source, the detector backend, and the registered
//! pose consumers. Each iteration pulls one frame, runs detection, and on
//! success normalizes the corner points into a `PoseRecord` that is handed
//! to every consumer. All per-frame data is dropped at the end of the
//! iteration; nothing is shared across frames.
//!
//! Failure semantics:
//! - No frame this tick and no marker this frame are expected steady-state
//!   conditions, skipped silently.
//! - A detection whose point set cannot be normalized to four points is
//!   downgraded to "no marker" and counted.
//! - A permanent source failure ends the loop; it is surfaced once in the
//!   `LoopReport` and never retried here. Restart policy belongs to an
//!   external supervisor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::detect::MarkerDetector;
use crate::emit::PoseConsumer;
use crate::frame::Frame;
use crate::geometry::{normalize_corner_points, order_corners};
use crate::ingest::{FramePull, FrameSource};
use crate::pose::build_pose;

const STATS_LOG_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Why the loop stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The termination signal was observed.
    ShutdownRequested,
    /// The frame source reported permanent failure.
    SourceFailed(String),
}

/// Terminal summary of a loop run.
#[derive(Clone, Debug)]
pub struct LoopReport {
    /// Frames pulled from the source.
    pub frames_seen: u64,
    /// Iterations where the source had no frame ready.
    pub pending_ticks: u64,
    /// Poses delivered to consumers.
    pub poses_emitted: u64,
    /// Detections downgraded because their point set could not be
    /// normalized to four corners.
    pub malformed_detections: u64,
    pub stop_reason: StopReason,
}

/// The tracking loop. Owns its source exclusively; the source is released
/// when the loop is dropped, on every exit path.
pub struct TrackingLoop {
    source: Box<dyn FrameSource>,
    detector: Box<dyn MarkerDetector>,
    consumers: Vec<Box<dyn PoseConsumer>>,
    shutdown: Arc<AtomicBool>,
    state: LoopState,
    frames_seen: u64,
    pending_ticks: u64,
    poses_emitted: u64,
    malformed_detections: u64,
}

impl TrackingLoop {
    pub fn new(source: Box<dyn FrameSource>, detector: Box<dyn MarkerDetector>) -> Self {
        Self {
            source,
            detector,
            consumers: Vec::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
            state: LoopState::Running,
            frames_seen: 0,
            pending_ticks: 0,
            poses_emitted: 0,
            malformed_detections: 0,
        }
    }

    /// Register a pose consumer. Consumers are called once per successful
    /// detection, in registration order.
    pub fn add_consumer(&mut self, consumer: Box<dyn PoseConsumer>) {
        self.consumers.push(consumer);
    }

    /// Flag polled once per iteration; store `true` to request shutdown.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Drive the loop until shutdown is requested or the source fails
    /// permanently. Consumes the loop, so the source is released on return.
    pub fn run(mut self) -> LoopReport {
        let mut last_stats_log = Instant::now();
        let stop_reason = loop {
            if self.shutdown.load(Ordering::SeqCst) {
                break StopReason::ShutdownRequested;
            }

            match self.source.next_frame() {
                Ok(FramePull::Frame(frame)) => {
                    self.frames_seen += 1;
                    self.process_frame(&frame);
                }
                Ok(FramePull::Pending) => {
                    self.pending_ticks += 1;
                    log::trace!("no frame this tick");
                }
                Err(e) => {
                    log::error!("frame source '{}' failed: {:#}", self.source.name(), e);
                    break StopReason::SourceFailed(format!("{:#}", e));
                }
            }

            if last_stats_log.elapsed() >= STATS_LOG_INTERVAL {
                let stats = self.source.stats();
                log::info!(
                    "tracking: frames={} poses={} source={}",
                    stats.frames_captured,
                    self.poses_emitted,
                    stats.source
                );
                last_stats_log = Instant::now();
            }
        };

        self.state = LoopState::Stopped;
        LoopReport {
            frames_seen: self.frames_seen,
            pending_ticks: self.pending_ticks,
            poses_emitted: self.poses_emitted,
            malformed_detections: self.malformed_detections,
            stop_reason,
        }
    }

    fn process_frame(&mut self, frame: &Frame) {
        let detection = match self.detector.detect(frame) {
            Ok(Some(detection)) => detection,
            Ok(None) => return,
            Err(e) => {
                log::warn!("detector error on frame {}: {:#}", frame.seq, e);
                return;
            }
        };

        let Some(points) = normalize_corner_points(&detection.points) else {
            self.malformed_detections += 1;
            log::debug!(
                "frame {}: detection with {} corner points downgraded to no-marker",
                frame.seq,
                detection.points.len()
            );
            return;
        };
        let Ok(ordered) = order_corners(&points) else {
            self.malformed_detections += 1;
            return;
        };

        let pose = build_pose(&detection.text, &ordered);
        for consumer in &mut self.consumers {
            consumer.on_pose(&pose);
        }
        self.poses_emitted += 1;
        log::debug!(
            "frame {}: pose '{}' centre [{}, {}]",
            frame.seq,
            pose.text,
            pose.centroid.x,
            pose.centroid.y
        );
    }
}

//! Pose emission to registered consumers.

use std::io::{self, Write};

use crate::pose::PoseRecord;

/// Receives each pose the tracking loop produces.
///
/// `on_pose` is fire-and-forget: it is called once per successful detection,
/// in frame order, and must not block the loop significantly. Consumer
/// failures are the consumer's problem; they never propagate into the loop.
pub trait PoseConsumer {
    /// Consumer identifier for logs.
    fn name(&self) -> &'static str;

    fn on_pose(&mut self, pose: &PoseRecord);
}

/// Writes the three-line textual pose telemetry to a sink.
pub struct TelemetryWriter<W: Write> {
    out: W,
}

impl TelemetryWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TelemetryWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> PoseConsumer for TelemetryWriter<W> {
    fn name(&self) -> &'static str {
        "telemetry"
    }

    fn on_pose(&mut self, pose: &PoseRecord) {
        if let Err(e) = writeln!(self.out, "{}", pose) {
            log::warn!("telemetry write failed: {}", e);
        }
    }
}

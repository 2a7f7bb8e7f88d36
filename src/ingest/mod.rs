//! Frame ingestion sources.
//!
//! This module provides the sources the tracking loop can pull frames from:
//! - ESP32-CAM HTTP streams (MJPEG multipart or single-JPEG snapshots)
//! - Stub source (`stub://` URLs, synthetic or scripted frames for tests)
//!
//! All sources produce decoded RGB `Frame` instances. The ingestion layer is
//! responsible for:
//! - Decoding JPEG frames in-memory
//! - Rate limiting / frame decimation to the configured target fps
//! - Distinguishing "no frame this tick" from a permanently dead stream

use anyhow::{anyhow, Result};
use url::Url;

use crate::config::StreamSettings;
use crate::frame::Frame;

pub mod esp32;
pub mod stub;

pub use esp32::Esp32Source;
pub use stub::StubSource;

/// Outcome of a single frame pull.
#[derive(Debug)]
pub enum FramePull {
    /// A decoded frame ready for detection.
    Frame(Frame),
    /// Nothing arrived this tick; the stream is still alive, try again.
    Pending,
}

/// Statistics for a frame source.
#[derive(Clone, Debug, Default)]
pub struct SourceStats {
    pub frames_captured: u64,
    pub source: String,
}

/// A camera stream the tracking loop can pull frames from.
///
/// `next_frame` returning `Err` means the stream is permanently down; the
/// caller must stop pulling and release the source. Recoverable conditions
/// (nothing decoded yet, a decimated frame) surface as `Ok(Pending)`.
pub trait FrameSource {
    /// Source identifier for logs.
    fn name(&self) -> &'static str;

    /// Establish the stream connection.
    fn connect(&mut self) -> Result<()>;

    /// Pull the next frame.
    fn next_frame(&mut self) -> Result<FramePull>;

    /// Capture statistics.
    fn stats(&self) -> SourceStats;
}

/// Build a frame source from the configured stream URL.
///
/// `stub://` URLs select the synthetic stub source; `http(s)://` URLs select
/// the ESP32-CAM HTTP source.
pub fn open_source(settings: &StreamSettings) -> Result<Box<dyn FrameSource>> {
    if settings.url.starts_with("stub://") {
        return Ok(Box::new(StubSource::synthetic(320, 240)));
    }
    let url = Url::parse(&settings.url)
        .map_err(|e| anyhow!("invalid stream url '{}': {}", settings.url, e))?;
    match url.scheme() {
        "http" | "https" => Ok(Box::new(Esp32Source::new(settings.clone()))),
        other => Err(anyhow!(
            "unsupported stream scheme '{}'; expected http(s) or stub",
            other
        )),
    }
}

//! ESP32-CAM HTTP frame source.
//!
//! Ingests frames from ESP32-CAM boards that stream MJPEG over HTTP (the
//! usual `http://<addr>:81/stream` endpoint) or serve single JPEG snapshots.
//!
//! The source is responsible for:
//! - Connecting to the HTTP stream and sniffing multipart vs. snapshot mode
//! - Scanning the byte stream for JPEG frame boundaries
//! - Decoding JPEG frames in-memory
//! - Decimating to the configured target frame rate

use std::io::Read;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use image::GenericImageView;

use crate::config::StreamSettings;
use crate::frame::Frame;

use super::{FramePull, FrameSource, SourceStats};

const MAX_JPEG_BYTES: usize = 5 * 1024 * 1024;

/// Consecutive snapshot fetch failures tolerated before the stream is
/// declared permanently down. Single failures are expected steady-state
/// noise on a flaky wifi camera.
const MAX_SNAPSHOT_FAILURES: u32 = 5;

/// ESP32-CAM frame source over HTTP.
pub struct Esp32Source {
    settings: StreamSettings,
    stream: Option<HttpStream>,
    last_frame_at: Option<Instant>,
    frame_count: u64,
    snapshot_failures: u32,
}

enum HttpStream {
    Mjpeg(MjpegStream),
    SingleJpeg,
}

impl Esp32Source {
    pub fn new(settings: StreamSettings) -> Self {
        Self {
            settings,
            stream: None,
            last_frame_at: None,
            frame_count: 0,
            snapshot_failures: 0,
        }
    }

    fn pull_jpeg(&mut self) -> Result<FramePull> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| anyhow!("esp32 source not connected; call connect() first"))?;

        let jpeg_bytes = match stream {
            // An error in multipart mode means the camera closed the stream:
            // permanent.
            HttpStream::Mjpeg(stream) => stream.read_next_jpeg()?,
            // Snapshot fetches fail transiently; only a run of consecutive
            // failures is promoted to a permanent stream failure.
            HttpStream::SingleJpeg => match fetch_single_jpeg(&self.settings.url) {
                Ok(bytes) => {
                    self.snapshot_failures = 0;
                    bytes
                }
                Err(e) => {
                    self.snapshot_failures += 1;
                    if self.snapshot_failures >= MAX_SNAPSHOT_FAILURES {
                        return Err(e.context(format!(
                            "{} consecutive snapshot failures",
                            self.snapshot_failures
                        )));
                    }
                    log::debug!("snapshot fetch failed ({}), retrying: {}", self.snapshot_failures, e);
                    return Ok(FramePull::Pending);
                }
            },
        };

        // Decimate to the target rate: frames arriving inside the minimum
        // interval are dropped without decoding.
        let now = Instant::now();
        let min_interval = frame_interval(self.settings.target_fps);
        if let Some(last) = self.last_frame_at {
            if now.duration_since(last) < min_interval {
                return Ok(FramePull::Pending);
            }
        }

        let (pixels, width, height) = decode_jpeg(&jpeg_bytes)?;
        self.frame_count += 1;
        self.last_frame_at = Some(now);

        Ok(FramePull::Frame(Frame::new(
            pixels,
            width,
            height,
            self.frame_count,
        )))
    }
}

impl FrameSource for Esp32Source {
    fn name(&self) -> &'static str {
        "esp32-http"
    }

    fn connect(&mut self) -> Result<()> {
        let response = ureq::get(&self.settings.url)
            .call()
            .context("connect to esp32 http stream")?;
        let content_type = response.header("Content-Type").unwrap_or("");
        if content_type.to_lowercase().contains("multipart") {
            let reader = response.into_reader();
            self.stream = Some(HttpStream::Mjpeg(MjpegStream::new(reader)));
            log::info!("Esp32Source: connected to {} (mjpeg)", self.settings.url);
        } else {
            self.stream = Some(HttpStream::SingleJpeg);
            log::info!("Esp32Source: connected to {} (snapshot)", self.settings.url);
        }
        Ok(())
    }

    fn next_frame(&mut self) -> Result<FramePull> {
        self.pull_jpeg()
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            source: self.settings.url.clone(),
        }
    }
}

struct MjpegStream {
    reader: Box<dyn Read + Send>,
    buffer: Vec<u8>,
}

impl MjpegStream {
    fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            buffer: Vec::with_capacity(64 * 1024),
        }
    }

    fn read_next_jpeg(&mut self) -> Result<Vec<u8>> {
        let mut chunk = vec![0u8; 8192];
        loop {
            if let Some((start, end)) = find_jpeg_bounds(&self.buffer) {
                let frame = self.buffer[start..end].to_vec();
                self.buffer.drain(..end);
                return Ok(frame);
            }

            let read = self.reader.read(&mut chunk).context("read mjpeg chunk")?;
            if read == 0 {
                return Err(anyhow!("mjpeg stream ended"));
            }
            self.buffer.extend_from_slice(&chunk[..read]);

            if self.buffer.len() > MAX_JPEG_BYTES * 2 {
                let keep = 2.min(self.buffer.len());
                let drain_len = self.buffer.len() - keep;
                self.buffer.drain(..drain_len);
            }
        }
    }
}

fn fetch_single_jpeg(url: &str) -> Result<Vec<u8>> {
    let response = ureq::get(url)
        .call()
        .with_context(|| format!("fetch jpeg snapshot from {}", url))?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .context("read jpeg snapshot")?;
    if bytes.is_empty() {
        return Err(anyhow!("empty jpeg snapshot"));
    }
    Ok(bytes)
}

fn decode_jpeg(bytes: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    let image = image::load_from_memory(bytes).context("decode jpeg")?;
    let (width, height) = image.dimensions();
    let rgb = image.into_rgb8();
    Ok((rgb.into_raw(), width, height))
}

/// Locate one complete JPEG (SOI..EOI inclusive) in a byte buffer.
fn find_jpeg_bounds(buffer: &[u8]) -> Option<(usize, usize)> {
    let mut start = None;
    let mut i = 0;
    while i + 1 < buffer.len() {
        if buffer[i] == 0xFF && buffer[i + 1] == 0xD8 {
            start = Some(i);
            break;
        }
        i += 1;
    }
    let start = start?;
    let mut j = start + 2;
    while j + 1 < buffer.len() {
        if buffer[j] == 0xFF && buffer[j + 1] == 0xD9 {
            return Some((start, j + 2));
        }
        j += 1;
    }
    None
}

fn frame_interval(target_fps: u32) -> Duration {
    if target_fps == 0 {
        Duration::from_millis(0)
    } else {
        Duration::from_millis((1000 / target_fps).max(1) as u64)
    }
}

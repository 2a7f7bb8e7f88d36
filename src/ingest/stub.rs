//! Stub frame source.
//!
//! Serves two purposes:
//! - `stub://` stream URLs get an endless synthetic source, so the daemon
//!   runs without camera hardware.
//! - Tests script an exact pull sequence (frames, pending ticks, a terminal
//!   failure) to drive the tracking loop deterministically.

use std::collections::VecDeque;

use anyhow::{anyhow, Result};

use crate::frame::Frame;

use super::{FramePull, FrameSource, SourceStats};

/// One scripted pull outcome.
pub enum ScriptStep {
    /// Emit a frame.
    Frame(Frame),
    /// Report "no frame this tick".
    Pending,
    /// Report permanent stream failure.
    Fail(&'static str),
}

enum StubMode {
    /// Endless synthetic frames.
    Synthetic { width: u32, height: u32 },
    /// Play back a fixed script, then report permanent failure.
    Scripted(VecDeque<ScriptStep>),
}

/// Stub frame source (synthetic or scripted).
pub struct StubSource {
    mode: StubMode,
    frame_count: u64,
}

impl StubSource {
    /// Endless synthetic source producing patterned RGB frames.
    pub fn synthetic(width: u32, height: u32) -> Self {
        Self {
            mode: StubMode::Synthetic { width, height },
            frame_count: 0,
        }
    }

    /// Source that plays back `steps` in order. Once the script is
    /// exhausted, further pulls report permanent failure.
    pub fn scripted(steps: Vec<ScriptStep>) -> Self {
        Self {
            mode: StubMode::Scripted(steps.into()),
            frame_count: 0,
        }
    }

    fn generate_synthetic_frame(&mut self, width: u32, height: u32) -> Frame {
        self.frame_count += 1;
        let pixel_count = (width * height * 3) as usize;
        let mut pixels = vec![0u8; pixel_count];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.frame_count) % 256) as u8;
        }
        Frame::new(pixels, width, height, self.frame_count)
    }
}

impl FrameSource for StubSource {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn connect(&mut self) -> Result<()> {
        let mode = match self.mode {
            StubMode::Synthetic { .. } => "synthetic",
            StubMode::Scripted(_) => "scripted",
        };
        log::info!("StubSource: connected ({})", mode);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<FramePull> {
        match &mut self.mode {
            StubMode::Synthetic { width, height } => {
                let (w, h) = (*width, *height);
                Ok(FramePull::Frame(self.generate_synthetic_frame(w, h)))
            }
            StubMode::Scripted(steps) => match steps.pop_front() {
                Some(ScriptStep::Frame(frame)) => {
                    self.frame_count += 1;
                    Ok(FramePull::Frame(frame))
                }
                Some(ScriptStep::Pending) => Ok(FramePull::Pending),
                Some(ScriptStep::Fail(reason)) => Err(anyhow!(reason)),
                None => Err(anyhow!("stub script exhausted")),
            },
        }
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            source: "stub://".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_source_produces_numbered_frames() {
        let mut source = StubSource::synthetic(8, 8);
        source.connect().unwrap();

        for expected_seq in 1..=3 {
            match source.next_frame().unwrap() {
                FramePull::Frame(frame) => {
                    assert_eq!(frame.seq, expected_seq);
                    assert_eq!(frame.width, 8);
                    assert_eq!(frame.pixels.len(), 8 * 8 * 3);
                }
                FramePull::Pending => panic!("synthetic source never pends"),
            }
        }
        assert_eq!(source.stats().frames_captured, 3);
    }

    #[test]
    fn scripted_source_plays_back_in_order() {
        let mut source = StubSource::scripted(vec![
            ScriptStep::Pending,
            ScriptStep::Frame(Frame::new(vec![0; 12], 2, 2, 1)),
            ScriptStep::Fail("stream closed"),
        ]);
        source.connect().unwrap();

        assert!(matches!(source.next_frame().unwrap(), FramePull::Pending));
        assert!(matches!(source.next_frame().unwrap(), FramePull::Frame(_)));
        let err = source.next_frame().unwrap_err();
        assert!(err.to_string().contains("stream closed"));
    }

    #[test]
    fn exhausted_script_reports_permanent_failure() {
        let mut source = StubSource::scripted(vec![]);
        assert!(source.next_frame().is_err());
    }
}

//! Stub detector backend.

use std::collections::VecDeque;

use anyhow::Result;

use crate::frame::Frame;
use crate::geometry::Point;

use super::backend::{MarkerDetection, MarkerDetector};

/// How often the synthetic stub "sees" a marker.
const SYNTHETIC_HIT_PERIOD: u64 = 10;

enum StubMode {
    /// Report a drifting synthetic marker every `SYNTHETIC_HIT_PERIOD`th
    /// frame, so a stub-wired daemon actually emits telemetry.
    Synthetic,
    /// Play back a fixed script of per-frame results. Exhausted script
    /// reports no marker.
    Scripted(VecDeque<Option<MarkerDetection>>),
}

/// Stub detector for tests and hardware-free runs.
pub struct StubDetector {
    mode: StubMode,
    frames_seen: u64,
}

impl StubDetector {
    pub fn synthetic() -> Self {
        Self {
            mode: StubMode::Synthetic,
            frames_seen: 0,
        }
    }

    /// Detector that answers each `detect` call with the next scripted
    /// result.
    pub fn scripted(results: Vec<Option<MarkerDetection>>) -> Self {
        Self {
            mode: StubMode::Scripted(results.into()),
            frames_seen: 0,
        }
    }

    fn synthetic_detection(&self) -> MarkerDetection {
        // A 100x100 square drifting right one pixel per processed frame,
        // corners deliberately out of canonical order.
        let offset = (self.frames_seen % 100) as f64;
        MarkerDetection {
            text: "STUB".to_string(),
            points: vec![
                Point::new(offset + 100.0, 120.0),
                Point::new(offset, 20.0),
                Point::new(offset + 100.0, 20.0),
                Point::new(offset, 120.0),
            ],
        }
    }
}

impl MarkerDetector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Option<MarkerDetection>> {
        self.frames_seen += 1;
        match &mut self.mode {
            StubMode::Synthetic => {
                if self.frames_seen % SYNTHETIC_HIT_PERIOD == 0 {
                    Ok(Some(self.synthetic_detection()))
                } else {
                    Ok(None)
                }
            }
            StubMode::Scripted(results) => Ok(results.pop_front().flatten()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(vec![0; 12], 2, 2, 1)
    }

    #[test]
    fn synthetic_mode_hits_periodically() {
        let mut detector = StubDetector::synthetic();
        let mut hits = 0;
        for _ in 0..(SYNTHETIC_HIT_PERIOD * 3) {
            if detector.detect(&frame()).unwrap().is_some() {
                hits += 1;
            }
        }
        assert_eq!(hits, 3);
    }

    #[test]
    fn synthetic_detection_reports_four_points() {
        let mut detector = StubDetector::synthetic();
        let mut detection = None;
        for _ in 0..SYNTHETIC_HIT_PERIOD {
            detection = detector.detect(&frame()).unwrap();
        }
        let detection = detection.expect("synthetic hit");
        assert_eq!(detection.text, "STUB");
        assert_eq!(detection.points.len(), 4);
    }

    #[test]
    fn scripted_mode_plays_back_then_reports_nothing() {
        let scripted = MarkerDetection {
            text: "HELLO".to_string(),
            points: vec![Point::new(0.0, 0.0)],
        };
        let mut detector = StubDetector::scripted(vec![None, Some(scripted)]);

        assert!(detector.detect(&frame()).unwrap().is_none());
        let hit = detector.detect(&frame()).unwrap().expect("scripted hit");
        assert_eq!(hit.text, "HELLO");
        // Script exhausted.
        assert!(detector.detect(&frame()).unwrap().is_none());
    }
}

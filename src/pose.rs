//! Per-frame pose records.
//!
//! A `PoseRecord` bundles the decoded marker text with the ordered corners
//! and their centroid, rounded to integer pixels for emission. Records are
//! frame-scoped: built, handed to consumers, dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{OrderedCorners, Point};

/// Integer pixel coordinate pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// Ordered corners rounded to integer pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelCorners {
    pub top_left: PixelPoint,
    pub top_right: PixelPoint,
    pub bottom_left: PixelPoint,
    pub bottom_right: PixelPoint,
}

/// Pose of a detected marker for one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseRecord {
    /// Text decoded from the marker.
    pub text: String,
    pub centroid: PixelPoint,
    pub corners: PixelCorners,
}

/// Round to the nearest integer pixel, ties to even.
fn round_pixel(p: Point) -> PixelPoint {
    PixelPoint {
        x: p.x.round_ties_even() as i32,
        y: p.y.round_ties_even() as i32,
    }
}

/// Build the pose record for one frame.
///
/// The centroid is the real-valued mean of the four corners; it and every
/// corner are then rounded ties-to-even for emission. Total: any well-formed
/// `OrderedCorners` produces a record, and rebuilding from the same inputs
/// yields an identical record.
pub fn build_pose(text: &str, corners: &OrderedCorners) -> PoseRecord {
    PoseRecord {
        text: text.to_string(),
        centroid: round_pixel(corners.centroid()),
        corners: PixelCorners {
            top_left: round_pixel(corners.top_left),
            top_right: round_pixel(corners.top_right),
            bottom_left: round_pixel(corners.bottom_left),
            bottom_right: round_pixel(corners.bottom_right),
        },
    }
}

impl fmt::Display for PoseRecord {
    /// Three-line textual form consumed by downstream text parsers.
    ///
    /// The label lines and the bracket/ordering layout of the corners line
    /// are a compatibility contract; do not reformat.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.corners;
        writeln!(f, "QR detected: {}", self.text)?;
        writeln!(f, "qr_centre: [{}, {}]", self.centroid.x, self.centroid.y)?;
        write!(
            f,
            "qr_corner = [[[{},{}], [{},{}]], [[{},{}], [{},{}]]]",
            c.top_left.x,
            c.top_left.y,
            c.top_right.x,
            c.top_right.y,
            c.bottom_left.x,
            c.bottom_left.y,
            c.bottom_right.x,
            c.bottom_right.y,
        )
    }
}

use anyhow::Result;

use crate::frame::Frame;
use crate::geometry::Point;

/// Marker text plus the raw, unordered corner points for one frame.
///
/// The points are exactly what the backend reported: any rotational order,
/// occasionally a malformed count. Shape normalization and corner-role
/// assignment happen downstream in the tracking loop.
#[derive(Clone, Debug)]
pub struct MarkerDetection {
    /// Text decoded from the marker.
    pub text: String,
    /// Corner points in image pixel coordinates, unordered.
    pub points: Vec<Point>,
}

/// Marker detector backend.
///
/// Implementations consume a decoded frame and report the decoded marker
/// text with its corner points, or `Ok(None)` when no marker is visible.
/// Backends must not retain the frame beyond the `detect` call.
pub trait MarkerDetector {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame. `Ok(None)` means no marker this frame.
    fn detect(&mut self, frame: &Frame) -> Result<Option<MarkerDetection>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

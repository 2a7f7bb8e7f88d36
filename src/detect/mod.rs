//! Marker detection boundary.
//!
//! Detection itself (QR decoding, error correction) is an external concern;
//! this module defines the trait the tracking loop calls through, the
//! detection result type, and the stub backend used for tests and
//! hardware-free runs.

use anyhow::{anyhow, Result};

pub mod backend;
pub mod stub;

pub use backend::{MarkerDetection, MarkerDetector};
pub use stub::StubDetector;

/// Build a detector backend by name.
pub fn create_detector(name: &str) -> Result<Box<dyn MarkerDetector>> {
    match name {
        "stub" => Ok(Box::new(StubDetector::synthetic())),
        other => Err(anyhow!("unknown detector backend '{}'; available: stub", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_backend_is_available_by_name() {
        let detector = create_detector("stub").unwrap();
        assert_eq!(detector.name(), "stub");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(create_detector("opencv").is_err());
    }
}

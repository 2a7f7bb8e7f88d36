//! qrtrack
//!
//! Pose tracking for a planar QR fiducial marker in a live camera stream.
//!
//! # Architecture
//!
//! Data flows one way per frame:
//!
//! frame -> detection -> raw points -> ordered corners -> pose record -> consumers
//!
//! Each stage is frame-scoped; no entity outlives one loop iteration and no
//! state is shared across frames.
//!
//! # Module Structure
//!
//! - `ingest`: frame sources (ESP32-CAM HTTP streams, stub)
//! - `detect`: marker detector boundary (trait + stub backend)
//! - `geometry`: canonical corner-role assignment
//! - `pose`: per-frame pose records and the telemetry text contract
//! - `track`: the per-frame tracking loop
//! - `emit`: pose consumers (telemetry writer)
//! - `config`: layered daemon configuration
//! - `teleop`: teleoperation link to the onboard receiver

pub mod config;
pub mod detect;
pub mod emit;
pub mod frame;
pub mod geometry;
pub mod ingest;
pub mod pose;
pub mod teleop;
pub mod track;

pub use config::{StreamSettings, TeleopSettings, TrackerConfig};
pub use detect::{create_detector, MarkerDetection, MarkerDetector, StubDetector};
pub use emit::{PoseConsumer, TelemetryWriter};
pub use frame::Frame;
pub use geometry::{
    normalize_corner_points, order_corners, InvalidCornerCount, OrderedCorners, Point,
};
pub use ingest::{open_source, Esp32Source, FramePull, FrameSource, SourceStats, StubSource};
pub use pose::{build_pose, PixelCorners, PixelPoint, PoseRecord};
pub use teleop::{map_key, Command, TeleopLink, Verb};
pub use track::{LoopReport, LoopState, StopReason, TrackingLoop};

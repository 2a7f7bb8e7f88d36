use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;

const DEFAULT_STREAM_URL: &str = "stub://camera";
const DEFAULT_TARGET_FPS: u32 = 10;
const DEFAULT_DETECTOR: &str = "stub";
const DEFAULT_TELEOP_ADDR: &str = "192.168.4.1:8080";
const DEFAULT_TELEOP_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize, Default)]
struct TrackerConfigFile {
    stream: Option<StreamConfigFile>,
    detector: Option<String>,
    teleop: Option<TeleopConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct StreamConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct TeleopConfigFile {
    addr: Option<String>,
    connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub stream: StreamSettings,
    /// Detector backend name.
    pub detector: String,
    pub teleop: TeleopSettings,
}

#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Camera stream URL (`http(s)://` for ESP32-CAM, `stub://` for tests).
    pub url: String,
    /// Target frame rate; faster sources are decimated.
    pub target_fps: u32,
}

#[derive(Debug, Clone)]
pub struct TeleopSettings {
    /// Onboard receiver address, host:port.
    pub addr: String,
    pub connect_timeout: Duration,
}

impl TrackerConfig {
    /// Load configuration: JSON file (explicit path, else `QRTRACK_CONFIG`,
    /// else defaults), then env overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var("QRTRACK_CONFIG").ok();
        let file_cfg = match path.or_else(|| env_path.as_deref().map(Path::new)) {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: TrackerConfigFile) -> Self {
        let stream = StreamSettings {
            url: file
                .stream
                .as_ref()
                .and_then(|stream| stream.url.clone())
                .unwrap_or_else(|| DEFAULT_STREAM_URL.to_string()),
            target_fps: file
                .stream
                .as_ref()
                .and_then(|stream| stream.target_fps)
                .unwrap_or(DEFAULT_TARGET_FPS),
        };
        let detector = file
            .detector
            .unwrap_or_else(|| DEFAULT_DETECTOR.to_string());
        let teleop = TeleopSettings {
            addr: file
                .teleop
                .as_ref()
                .and_then(|teleop| teleop.addr.clone())
                .unwrap_or_else(|| DEFAULT_TELEOP_ADDR.to_string()),
            connect_timeout: Duration::from_secs(
                file.teleop
                    .and_then(|teleop| teleop.connect_timeout_secs)
                    .unwrap_or(DEFAULT_TELEOP_TIMEOUT_SECS),
            ),
        };
        Self {
            stream,
            detector,
            teleop,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("QRTRACK_STREAM_URL") {
            if !url.trim().is_empty() {
                self.stream.url = url;
            }
        }
        if let Ok(fps) = std::env::var("QRTRACK_TARGET_FPS") {
            let fps: u32 = fps
                .parse()
                .map_err(|_| anyhow!("QRTRACK_TARGET_FPS must be an integer frame rate"))?;
            self.stream.target_fps = fps;
        }
        if let Ok(detector) = std::env::var("QRTRACK_DETECTOR") {
            if !detector.trim().is_empty() {
                self.detector = detector;
            }
        }
        if let Ok(addr) = std::env::var("QRTRACK_TELEOP_ADDR") {
            if !addr.trim().is_empty() {
                self.teleop.addr = addr;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.stream.url.trim().is_empty() {
            return Err(anyhow!("stream url must not be empty"));
        }
        if self.stream.target_fps == 0 {
            return Err(anyhow!("target_fps must be greater than zero"));
        }
        if self.detector.trim().is_empty() {
            return Err(anyhow!("detector backend name must not be empty"));
        }
        if self.teleop.connect_timeout.as_secs() == 0 {
            return Err(anyhow!("teleop connect timeout must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<TrackerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

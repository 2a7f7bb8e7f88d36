use std::sync::Mutex;

use tempfile::NamedTempFile;

use qrtrack::config::TrackerConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "QRTRACK_CONFIG",
        "QRTRACK_STREAM_URL",
        "QRTRACK_TARGET_FPS",
        "QRTRACK_DETECTOR",
        "QRTRACK_TELEOP_ADDR",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "stream": {
            "url": "http://192.168.4.3:81/stream",
            "target_fps": 12
        },
        "detector": "stub",
        "teleop": {
            "addr": "192.168.4.1:8080",
            "connect_timeout_secs": 3
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("QRTRACK_CONFIG", file.path());
    std::env::set_var("QRTRACK_STREAM_URL", "http://10.0.0.9:81/stream");
    std::env::set_var("QRTRACK_TELEOP_ADDR", "10.0.0.1:9000");

    let cfg = TrackerConfig::load(None).expect("load config");

    // Env wins over file for the stream url and teleop address.
    assert_eq!(cfg.stream.url, "http://10.0.0.9:81/stream");
    assert_eq!(cfg.teleop.addr, "10.0.0.1:9000");
    // File values survive where no env override exists.
    assert_eq!(cfg.stream.target_fps, 12);
    assert_eq!(cfg.detector, "stub");
    assert_eq!(cfg.teleop.connect_timeout.as_secs(), 3);

    clear_env();
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = TrackerConfig::load(None).expect("load config");

    assert_eq!(cfg.stream.url, "stub://camera");
    assert_eq!(cfg.stream.target_fps, 10);
    assert_eq!(cfg.detector, "stub");
    assert_eq!(cfg.teleop.addr, "192.168.4.1:8080");
    assert_eq!(cfg.teleop.connect_timeout.as_secs(), 5);

    clear_env();
}

#[test]
fn rejects_non_numeric_fps_override() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("QRTRACK_TARGET_FPS", "fast");
    assert!(TrackerConfig::load(None).is_err());

    clear_env();
}

#[test]
fn rejects_zero_fps() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("QRTRACK_TARGET_FPS", "0");
    assert!(TrackerConfig::load(None).is_err());

    clear_env();
}

use bridge_config::{ConfigSource, load_file, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

#[rstest]
#[case("[controller]\nsend_frequency = 0", "send_frequency must be > 0")]
#[case("[controller]\nsend_frequency = 5000", "unreasonably large")]
#[case("[controller]\naef = 0.0", "controller.aef must be in (0.0, 1.0]")]
#[case("[controller]\naef_cc1 = 1.5", "controller.aef_cc1 must be in (0.0, 1.0]")]
#[case("[controller]\ncc1_max = -3.0", "cc1_max must be > 0")]
#[case("[mapping]\ncc11 = 200", "mapping.cc11 must be in [0, 127]")]
#[case("[output]\nmidi_channel = 16", "midi_channel must be in [0, 15]")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation must be one of")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "expected {needle:?} in {err}"
    );
}

#[test]
fn accepts_full_document() {
    let toml = r#"
[controller]
aef = 0.3
aef_cc1 = 0.5
cc1_max = 45.0
send_frequency = 100
listen_port = 9000
cc1_enabled = true
cc11_enabled = false
cc_opt_enabled = true

[sensors]
cc1 = "smooth"
cc11 = "raw"
cc_opt = "smooth"

[display]
para_monitor_display = "off"

[mapping]
cc1 = 7
cc11 = 74
cc_opt = 64

[output]
device = "loopMIDI"
midi_channel = 2

[discovery]
enabled = false

[logging]
level = "debug"
rotation = "daily"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.controller.listen_port, 9000);
    assert_eq!(cfg.controller.effective_aef_cc11(), 0.3);
    assert_eq!(cfg.output.device.as_deref(), Some("loopMIDI"));
    assert!(!cfg.discovery.enabled);
    assert_eq!(cfg.discovery.instance_name, "MIDISensorController");
}

#[test]
fn missing_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let loaded = load_file(&path);
    assert_eq!(loaded.source, ConfigSource::Missing(path));
    assert_eq!(loaded.config.controller.listen_port, 8081);
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("set.toml");
    fs::write(&path, "[controller\nlisten_port = 9000").unwrap();
    let loaded = load_file(&path);
    match loaded.source {
        ConfigSource::Invalid { reason, .. } => assert!(reason.contains("parse failed")),
        other => panic!("expected Invalid, got {other:?}"),
    }
    assert_eq!(loaded.config.controller.listen_port, 8081);
}

#[test]
fn invalid_values_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("set.toml");
    fs::write(&path, "[controller]\nlisten_port = 9000\nsend_frequency = 0\n").unwrap();
    let loaded = load_file(&path);
    assert!(matches!(loaded.source, ConfigSource::Invalid { .. }));
    assert_eq!(loaded.config.controller.listen_port, 8081);
}

#[test]
fn valid_file_is_used() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("set.toml");
    fs::write(&path, "[controller]\nlisten_port = 9100\n").unwrap();
    let loaded = load_file(&path);
    assert_eq!(loaded.source, ConfigSource::File(path));
    assert_eq!(loaded.config.controller.listen_port, 9100);
}

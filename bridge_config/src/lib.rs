#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the sensor bridge.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every key is optional; absent keys take the built-in defaults.
//! - `load_file` never fails: unreadable or invalid files fall back to
//!   defaults and report why through `ConfigSource`.
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Built-in control identifiers for primary, secondary and auxiliary channels.
pub const DEFAULT_MAPPING: (u8, u8, u8) = (1, 11, 3);

/// Smoothing selection for a sensor channel.
///
/// `"smooth"` (any case) enables the filter; any other value is passthrough.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(from = "String")]
pub enum SmoothMode {
    Smooth,
    Passthrough,
}

impl From<String> for SmoothMode {
    fn from(s: String) -> Self {
        if s.trim().eq_ignore_ascii_case("smooth") {
            Self::Smooth
        } else {
            Self::Passthrough
        }
    }
}

/// Console monitor rendering.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "String")]
pub enum DisplayMode {
    #[default]
    Text,
    Graphic,
    Off,
}

impl From<String> for DisplayMode {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "graphic" => Self::Graphic,
            "off" | "false" => Self::Off,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Controller {
    /// Global smoothing coefficient, used where a per-channel one is absent.
    pub aef: f64,
    pub aef_cc1: Option<f64>,
    pub aef_cc11: Option<f64>,
    /// Upper bound of the primary channel's input domain.
    pub cc1_max: f64,
    /// Output tick rate in Hz.
    pub send_frequency: f64,
    pub listen_port: u16,
    pub cc1_enabled: bool,
    pub cc11_enabled: bool,
    pub cc_opt_enabled: bool,
}

impl Default for Controller {
    fn default() -> Self {
        Self {
            aef: 0.1,
            aef_cc1: None,
            aef_cc11: None,
            cc1_max: 30.0,
            send_frequency: 60.0,
            listen_port: 8081,
            cc1_enabled: true,
            cc11_enabled: true,
            cc_opt_enabled: false,
        }
    }
}

impl Controller {
    pub fn effective_aef_cc1(&self) -> f64 {
        self.aef_cc1.unwrap_or(self.aef)
    }

    pub fn effective_aef_cc11(&self) -> f64 {
        self.aef_cc11.unwrap_or(self.aef)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Sensors {
    pub cc1: SmoothMode,
    pub cc11: SmoothMode,
    /// Parsed only so it can be reported; the auxiliary channel never smooths.
    pub cc_opt: Option<String>,
}

impl Default for Sensors {
    fn default() -> Self {
        Self {
            cc1: SmoothMode::Smooth,
            cc11: SmoothMode::Passthrough,
            cc_opt: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Display {
    pub para_monitor_display: DisplayMode,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Mapping {
    pub cc1: u8,
    pub cc11: u8,
    pub cc_opt: u8,
}

impl Default for Mapping {
    fn default() -> Self {
        let (cc1, cc11, cc_opt) = DEFAULT_MAPPING;
        Self { cc1, cc11, cc_opt }
    }
}

impl Mapping {
    /// True when any two of the three identifiers collide, enabled or not.
    pub fn has_conflict(&self) -> bool {
        self.cc1 == self.cc11 || self.cc1 == self.cc_opt || self.cc11 == self.cc_opt
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Output {
    /// Output port name (exact or substring match); automatic when absent.
    pub device: Option<String>,
    /// MIDI channel, 0-based.
    pub midi_channel: u8,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DiscoveryCfg {
    pub enabled: bool,
    pub service_type: String,
    pub instance_name: String,
}

impl Default for DiscoveryCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            service_type: "_midi._tcp.local.".to_string(),
            instance_name: "MIDISensorController".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub controller: Controller,
    pub sensors: Sensors,
    pub display: Display,
    pub mapping: Mapping,
    pub output: Output,
    pub discovery: DiscoveryCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file at the path; built-in defaults in effect.
    Missing(PathBuf),
    /// File present but unusable; built-in defaults in effect.
    Invalid { path: PathBuf, reason: String },
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub config: Config,
    pub source: ConfigSource,
}

/// Read, parse and validate `path`, falling back to defaults on any failure.
pub fn load_file(path: &Path) -> Loaded {
    if !path.exists() {
        return Loaded {
            config: Config::default(),
            source: ConfigSource::Missing(path.to_path_buf()),
        };
    }
    let invalid = |reason: String| Loaded {
        config: Config::default(),
        source: ConfigSource::Invalid {
            path: path.to_path_buf(),
            reason,
        },
    };
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => return invalid(format!("read failed: {e}")),
    };
    let cfg = match load_toml(&text) {
        Ok(c) => c,
        Err(e) => return invalid(format!("parse failed: {e}")),
    };
    if let Err(e) = cfg.validate() {
        return invalid(format!("{e}"));
    }
    Loaded {
        config: cfg,
        source: ConfigSource::File(path.to_path_buf()),
    }
}

fn check_coefficient(name: &str, v: f64) -> eyre::Result<()> {
    if !(v > 0.0 && v <= 1.0) {
        eyre::bail!("{name} must be in (0.0, 1.0]");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Controller
        check_coefficient("controller.aef", self.controller.aef)?;
        if let Some(v) = self.controller.aef_cc1 {
            check_coefficient("controller.aef_cc1", v)?;
        }
        if let Some(v) = self.controller.aef_cc11 {
            check_coefficient("controller.aef_cc11", v)?;
        }
        if !(self.controller.cc1_max.is_finite() && self.controller.cc1_max > 0.0) {
            eyre::bail!("controller.cc1_max must be > 0");
        }
        let hz = self.controller.send_frequency;
        if !(hz.is_finite() && hz > 0.0) {
            eyre::bail!("controller.send_frequency must be > 0");
        }
        if hz > 1000.0 {
            eyre::bail!("controller.send_frequency is unreasonably large (>1000 Hz)");
        }

        // Mapping
        for (name, id) in [
            ("mapping.cc1", self.mapping.cc1),
            ("mapping.cc11", self.mapping.cc11),
            ("mapping.cc_opt", self.mapping.cc_opt),
        ] {
            if id > 127 {
                eyre::bail!("{name} must be in [0, 127]");
            }
        }

        // Output
        if self.output.midi_channel > 15 {
            eyre::bail!("output.midi_channel must be in [0, 15]");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly");
        }

        // Mapping conflicts are repaired at conversion time, not rejected here.
        Ok(())
    }
}

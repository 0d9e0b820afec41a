//! Bridge assembly: config lookup, device and socket setup, run until
//! interrupted.

use std::path::PathBuf;
use std::time::Duration;

use bridge_config::{Config, ConfigSource, DiscoveryCfg, Output};
use bridge_core::{
    Bridge, BridgeError, BridgeParts, BridgeSettings, ChannelId, DEFAULT_SHUTDOWN_TIMEOUT,
    IngressListener,
};
use bridge_traits::clock::MonotonicClock;
use bridge_traits::{Discovery, OutputSink, ServiceAdvert};
use bridge_ui::ConsoleDisplay;
use crossbeam_channel as xch;
use eyre::WrapErr;

use crate::cli::{CONFIG_ENV, CONFIG_FILE_NAME, Cli, RUN_MS_ENV, resolve_port};

/// `$SENSOR_BRIDGE_CONFIG`, else `set.toml` beside the executable, else
/// `set.toml` in the working directory.
pub fn config_path() -> PathBuf {
    if let Some(p) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(p);
    }
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|d| d.join(CONFIG_FILE_NAME)));
    match beside_exe {
        Some(p) if p.exists() => p,
        _ => PathBuf::from(CONFIG_FILE_NAME),
    }
}

pub fn report_config_source(source: &ConfigSource) {
    match source {
        ConfigSource::File(path) => tracing::info!(path = %path.display(), "config loaded"),
        ConfigSource::Missing(path) => {
            tracing::info!(path = %path.display(), "no config file; using defaults");
        }
        ConfigSource::Invalid { path, reason } => {
            let err = BridgeError::Config(reason.clone());
            tracing::warn!(path = %path.display(), error = %err, "config unusable; using defaults");
        }
    }
}

fn log_settings(s: &BridgeSettings) {
    for id in ChannelId::ALL {
        let ch = s.channel(id);
        tracing::info!(
            channel = %id,
            enabled = ch.enabled,
            control = ch.mapping_id,
            domain_max = ch.domain_max,
            smoothing = ch.smoothing_enabled,
            coefficient = ch.smoothing_coefficient,
            "channel"
        );
    }
    tracing::info!(
        send_hz = s.send_frequency_hz,
        display = ?s.display_mode,
        "output settings"
    );
}

#[cfg(feature = "midi")]
fn open_sink(out: &Output) -> Result<Box<dyn OutputSink + Send>, BridgeError> {
    let sink = bridge_hardware::MidiSink::open(out.device.as_deref(), out.midi_channel)
        .map_err(|e| BridgeError::DeviceOpen(e.to_string()))?;
    tracing::info!(port = sink.port_name(), channel = out.midi_channel, "MIDI output open");
    Ok(Box::new(sink))
}

#[cfg(not(feature = "midi"))]
fn open_sink(out: &Output) -> Result<Box<dyn OutputSink + Send>, BridgeError> {
    tracing::info!(
        device = out.device.as_deref().unwrap_or("<auto>"),
        "built without the midi feature; using simulated output"
    );
    Ok(Box::new(bridge_hardware::SimulatedSink::new()))
}

fn discovery(cfg: &DiscoveryCfg, port: u16) -> Option<(Box<dyn Discovery + Send>, ServiceAdvert)> {
    if !cfg.enabled {
        tracing::info!("service discovery disabled");
        return None;
    }
    let advert = ServiceAdvert {
        service_type: cfg.service_type.clone(),
        instance_name: cfg.instance_name.clone(),
        address: bridge_hardware::local_ip(),
        port,
        metadata: vec![("description".into(), "MIDI Sensor Controller".into())],
    };
    #[cfg(feature = "mdns")]
    let d: Box<dyn Discovery + Send> = Box::new(bridge_hardware::MdnsDiscovery::new());
    #[cfg(not(feature = "mdns"))]
    let d: Box<dyn Discovery + Send> = Box::new(bridge_hardware::LoggingDiscovery::new());
    Some((d, advert))
}

fn run_limit() -> Option<Duration> {
    std::env::var(RUN_MS_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Start the bridge and block until Ctrl+C (or the test run limit).
pub fn run(cli: &Cli, cfg: &Config) -> eyre::Result<()> {
    let mut settings = BridgeSettings::from(cfg);
    settings.listen_port = resolve_port(cli.port.as_deref(), settings.listen_port);
    log_settings(&settings);

    let listener = IngressListener::bind(settings.listen_port)?;
    let sink = open_sink(&cfg.output)?;
    let display = ConsoleDisplay::stdout(settings.display_mode);
    let discovery = discovery(&cfg.discovery, listener.port());

    let (stop_tx, stop_rx) = xch::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .wrap_err("installing interrupt handler")?;

    let bridge = Bridge::start(BridgeParts {
        listener,
        sink,
        display,
        settings,
        clock: std::sync::Arc::new(MonotonicClock::new()),
        discovery,
    })?;
    tracing::info!(port = bridge.port(), "bridge running; press Ctrl+C to stop");

    match run_limit() {
        Some(limit) => {
            let _ = stop_rx.recv_timeout(limit);
        }
        None => {
            let _ = stop_rx.recv();
        }
    }
    tracing::info!("shutting down");

    let report = bridge.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    if !report.is_clean() {
        tracing::warn!(
            abandoned = ?report.abandoned,
            panicked = ?report.panicked,
            "shutdown incomplete"
        );
    }
    Ok(())
}

//! CLI argument definitions and shared statics.

use clap::Parser;
use std::sync::OnceLock;

/// Keeps the non-blocking file writer alive for the whole process.
pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SENSOR_BRIDGE_CONFIG";
/// Stop after this many milliseconds, as if interrupted.
pub const RUN_MS_ENV: &str = "SENSOR_BRIDGE_RUN_MS";
/// Config file name looked up beside the executable, then in the working directory.
pub const CONFIG_FILE_NAME: &str = "set.toml";

#[derive(Parser, Debug)]
#[command(
    name = "sensor-bridge",
    version,
    about = "Forward UDP sensor samples to MIDI control changes"
)]
pub struct Cli {
    /// UDP port to listen on; overrides controller.listen_port
    #[arg(value_name = "PORT")]
    pub port: Option<String>,
}

/// Use `arg` as a port if it parses, otherwise warn and keep `configured`.
pub fn resolve_port(arg: Option<&str>, configured: u16) -> u16 {
    let Some(raw) = arg else {
        return configured;
    };
    match raw.trim().parse::<u16>() {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(
                argument = raw,
                error = %e,
                fallback = configured,
                "invalid port argument; using configured port"
            );
            configured
        }
    }
}

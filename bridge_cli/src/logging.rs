//! Subscriber setup: human-readable console output on stderr plus an
//! optional JSON-lines file.

use std::io::IsTerminal;
use std::path::Path;

use bridge_config::Logging;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::FILE_GUARD;

/// `RUST_LOG` wins over `[logging].level`, which wins over `info`.
fn filter(cfg: &Logging) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.level.as_deref().unwrap_or("info")))
}

fn file_writer(path: &str, rotation: Option<&str>) -> tracing_appender::non_blocking::NonBlocking {
    let p = Path::new(path);
    let dir = p
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = p
        .file_name()
        .map_or_else(|| "bridge.log".into(), |n| n.to_string_lossy().into_owned());
    let appender = match rotation {
        Some("daily") => tracing_appender::rolling::daily(dir, name),
        Some("hourly") => tracing_appender::rolling::hourly(dir, name),
        _ => tracing_appender::rolling::never(dir, name),
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);
    writer
}

pub fn init(cfg: &Logging) {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_thread_names(true);

    let file = cfg.file.as_deref().map(|path| {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(file_writer(path, cfg.rotation.as_deref()))
    });

    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter(cfg))
        .with(console)
        .with(file)
        .try_init();
}

#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
//! Console monitor for received sensor samples.
//!
//! `text` prints `received: cc1=12.5, cc11=40.0`; `graphic` prints one line
//! placing `@` (primary) and `||` (secondary) at columns proportional to
//! their values.

use std::io::{self, Write};

use bridge_config::DisplayMode;
use bridge_traits::{DisplayEvent, DisplaySink};

/// Widest graphic line, in columns.
pub const GRAPHIC_MAX_COLUMNS: usize = 200;

fn columns(v: f64) -> usize {
    if v.is_finite() && v > 0.0 {
        (v.trunc() as usize).min(GRAPHIC_MAX_COLUMNS)
    } else {
        0
    }
}

/// `cc1=12.5, cc11=40.0, cc_opt=1.0`, skipping absent channels.
pub fn text_line(primary: Option<f64>, secondary: Option<f64>, auxiliary: Option<f64>) -> String {
    [("cc1", primary), ("cc11", secondary), ("cc_opt", auxiliary)]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| format!("{k}={v:.1}")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bar line: the smaller value is drawn first, the gap between them is the
/// difference. Absent values count as zero.
pub fn graphic_line(primary: Option<f64>, secondary: Option<f64>) -> String {
    let p = primary.unwrap_or(0.0);
    let s = secondary.unwrap_or(0.0);
    if p > s {
        format!(
            "{}||{}@",
            " ".repeat(columns(s)),
            " ".repeat(columns(p - s))
        )
    } else {
        format!(
            "{}@{}||",
            " ".repeat(columns(p)),
            " ".repeat(columns(s - p))
        )
    }
}

/// Render one event for `mode`; `None` when nothing should be printed.
pub fn render(mode: DisplayMode, event: &DisplayEvent) -> Option<String> {
    match (mode, event) {
        (DisplayMode::Off, _) => None,
        (_, DisplayEvent::Malformed(msg)) => Some(format!("invalid data format: {msg}")),
        (
            DisplayMode::Graphic,
            DisplayEvent::Sample {
                primary, secondary, ..
            },
        ) => Some(graphic_line(*primary, *secondary)),
        (
            DisplayMode::Text,
            DisplayEvent::Sample {
                primary,
                secondary,
                auxiliary,
            },
        ) => {
            let body = text_line(*primary, *secondary, *auxiliary);
            (!body.is_empty()).then(|| format!("received: {body}"))
        }
    }
}

/// Line-oriented display writing to any `Write`.
#[derive(Debug)]
pub struct ConsoleDisplay<W: Write> {
    out: W,
    mode: DisplayMode,
}

impl ConsoleDisplay<io::Stdout> {
    pub fn stdout(mode: DisplayMode) -> Self {
        Self::new(io::stdout(), mode)
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, mode: DisplayMode) -> Self {
        Self { out, mode }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for ConsoleDisplay<W> {
    fn show(&mut self, event: &DisplayEvent) {
        if let Some(line) = render(self.mode, event) {
            // A closed stdout must not take the listener down.
            let _ = writeln!(self.out, "{line}");
        }
    }
}

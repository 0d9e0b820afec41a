//! Test and helper mocks for bridge_core

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bridge_traits::{DisplayEvent, DisplaySink, OutputSink};

/// Records every control change; can be told to fail sends for one control.
///
/// Clones share the same log, so a test keeps one handle while the sink
/// itself moves into the output worker.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<(u8, u8)>>>,
    fail_control: Option<u8>,
    unavailable: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send to `control` returns an error.
    pub fn failing_on(control: u8) -> Self {
        Self {
            fail_control: Some(control),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(u8, u8)> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Sent values for one control, in order.
    pub fn values_for(&self, control: u8) -> Vec<u8> {
        self.sent()
            .into_iter()
            .filter(|(c, _)| *c == control)
            .map(|(_, v)| v)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut l) = self.log.lock() {
            l.clear();
        }
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::Relaxed);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

impl OutputSink for RecordingSink {
    fn send_control_change(
        &mut self,
        control: u8,
        value: u8,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail_control == Some(control) {
            return Err(Box::new(std::io::Error::other("recording sink: send refused")));
        }
        if let Ok(mut l) = self.log.lock() {
            l.push((control, value));
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::Relaxed)
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

/// Collects display events; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    events: Arc<Mutex<Vec<DisplayEvent>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl DisplaySink for RecordingDisplay {
    fn show(&mut self, event: &DisplayEvent) {
        if let Ok(mut e) = self.events.lock() {
            e.push(event.clone());
        }
    }
}

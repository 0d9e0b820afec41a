pub mod discovery;
pub mod error;
#[cfg(feature = "midi")]
pub mod midi;
pub mod ports;

use bridge_traits::OutputSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub use discovery::{LoggingDiscovery, local_ip};
#[cfg(feature = "mdns")]
pub use discovery::MdnsDiscovery;
#[cfg(feature = "midi")]
pub use midi::MidiSink;

/// Simulated output sink: logs each control change instead of sending it.
///
/// Used when the binary is built without the `midi` feature.
pub struct SimulatedSink {
    sent: Arc<AtomicU64>,
    open: Arc<AtomicBool>,
}

impl Default for SimulatedSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSink {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(AtomicU64::new(0)),
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Shared counter of events accepted so far.
    pub fn sent_counter(&self) -> Arc<AtomicU64> {
        self.sent.clone()
    }
}

impl OutputSink for SimulatedSink {
    fn send_control_change(
        &mut self,
        control: u8,
        value: u8,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.open.load(Ordering::Relaxed) {
            return Err(Box::new(error::HwError::Closed));
        }
        tracing::debug!(control, value, "control change (simulated)");
        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.open.store(false, Ordering::Relaxed);
        tracing::debug!("simulated output closed");
        Ok(())
    }
}

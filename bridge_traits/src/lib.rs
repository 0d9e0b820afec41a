pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::net::IpAddr;

/// Destination for control-change events (a MIDI output port or a stand-in).
pub trait OutputSink {
    fn send_control_change(
        &mut self,
        control: u8,
        value: u8,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// False when the underlying handle is gone; the output worker skips ticks.
    fn is_available(&self) -> bool {
        true
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

impl<T: OutputSink + ?Sized> OutputSink for Box<T> {
    fn send_control_change(
        &mut self,
        control: u8,
        value: u8,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).send_control_change(control, value)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).close()
    }
}

/// Service advertised on the local network so sensor sources can find us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAdvert {
    pub service_type: String,
    pub instance_name: String,
    pub address: IpAddr,
    pub port: u16,
    pub metadata: Vec<(String, String)>,
}

pub trait Discovery {
    fn register(
        &mut self,
        advert: &ServiceAdvert,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn unregister(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Values handed to the display after a datagram was ingested.
///
/// Sample fields carry the parsed (pre-clamp) value of each enabled channel
/// that was present in the datagram.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Sample {
        primary: Option<f64>,
        secondary: Option<f64>,
        auxiliary: Option<f64>,
    },
    Malformed(String),
}

pub trait DisplaySink {
    fn show(&mut self, event: &DisplayEvent);
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn show(&mut self, event: &DisplayEvent) {
        (**self).show(event);
    }
}

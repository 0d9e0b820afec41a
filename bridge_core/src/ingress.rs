//! UDP ingestion of sensor samples.
//!
//! One datagram carries up to three space-separated decimal numbers in
//! channel order: `"<primary> <secondary> <auxiliary>"`. Each field is parsed
//! independently; a bad field is logged and skipped without affecting the
//! others or stopping the listener.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use bridge_config::DisplayMode;
use bridge_traits::{DisplayEvent, DisplaySink};
use tracing::{debug, info, trace, warn};

use crate::channel::{ChannelId, ChannelSet};
use crate::error::BridgeError;
use crate::liveness::Liveness;
use crate::runner::StopToken;

/// Upper bound on one blocking receive, so the stop token is polled.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(1);
/// Receive buffer size; longer datagrams are truncated by the OS.
pub const MAX_DATAGRAM: usize = 1024;

/// Split a payload into fields on single spaces after trimming the end.
pub fn split_fields(text: &str) -> Vec<&str> {
    text.trim_end().split(' ').collect()
}

/// Parse one field as a finite decimal number.
pub fn parse_field(index: usize, text: &str) -> Result<f64, BridgeError> {
    let malformed = |reason: String| BridgeError::MalformedDatagram {
        index,
        text: text.to_string(),
        reason,
    };
    let v: f64 = text.parse().map_err(|e| malformed(format!("{e}")))?;
    if !v.is_finite() {
        return Err(malformed("not a finite number".to_string()));
    }
    Ok(v)
}

/// What one datagram did to the channels.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestReport {
    /// Parsed (pre-clamp) value per channel, in field order.
    pub values: [Option<f64>; 3],
    pub failures: Vec<BridgeError>,
}

impl IngestReport {
    pub fn any_parsed(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }

    pub fn value(&self, id: ChannelId) -> Option<f64> {
        self.values[id.field_index()]
    }
}

/// Applies datagrams to the shared channel state.
#[derive(Debug)]
pub struct Ingestor {
    channels: Arc<ChannelSet>,
    liveness: Arc<Liveness>,
    display_mode: DisplayMode,
}

impl Ingestor {
    pub fn new(
        channels: Arc<ChannelSet>,
        liveness: Arc<Liveness>,
        display_mode: DisplayMode,
    ) -> Self {
        Self {
            channels,
            liveness,
            display_mode,
        }
    }

    pub fn ingest<D: DisplaySink + ?Sized>(&self, payload: &[u8], display: &mut D) -> IngestReport {
        let text = String::from_utf8_lossy(payload);
        let message = text.trim_end();
        let mut report = IngestReport::default();
        if message.is_empty() {
            trace!("empty datagram ignored");
            return report;
        }

        let fields = split_fields(message);
        for id in ChannelId::ALL {
            let ch = self.channels.get(id);
            if !ch.config().enabled {
                continue;
            }
            let idx = id.field_index();
            let Some(field) = fields.get(idx) else {
                continue;
            };
            match parse_field(idx, field) {
                Ok(v) => {
                    let (raw, filtered) = ch.ingest(v);
                    trace!(channel = %id, input = v, raw, filtered, "sample");
                    report.values[idx] = Some(v);
                }
                Err(e) => {
                    warn!(channel = %id, error = %e, "discarding malformed field");
                    report.failures.push(e);
                }
            }
        }

        if report.any_parsed() {
            self.liveness.touch();
            if self.display_mode != DisplayMode::Off && !self.liveness.is_timed_out() {
                display.show(&DisplayEvent::Sample {
                    primary: report.value(ChannelId::Primary),
                    secondary: report.value(ChannelId::Secondary),
                    auxiliary: report.value(ChannelId::Auxiliary),
                });
            }
        } else if !report.failures.is_empty() && self.display_mode != DisplayMode::Off {
            display.show(&DisplayEvent::Malformed(message.to_string()));
        }
        report
    }
}

/// Owns the datagram socket for the lifetime of the ingress worker.
#[derive(Debug)]
pub struct IngressListener {
    socket: UdpSocket,
    port: u16,
}

impl IngressListener {
    /// Bind on all interfaces.
    pub fn bind(port: u16) -> Result<Self, BridgeError> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
    }

    pub fn bind_addr(addr: SocketAddr) -> Result<Self, BridgeError> {
        let bind_err = |e: std::io::Error| BridgeError::NetworkBind {
            port: addr.port(),
            reason: e.to_string(),
        };
        let socket = UdpSocket::bind(addr).map_err(bind_err)?;
        socket.set_read_timeout(Some(RECV_TIMEOUT)).map_err(bind_err)?;
        let port = socket.local_addr().map_err(bind_err)?.port();
        Ok(Self { socket, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Shorten the receive ceiling (tests use this to stop faster).
    pub fn set_recv_timeout(&self, d: Duration) -> std::io::Result<()> {
        self.socket.set_read_timeout(Some(d))
    }

    /// Receive until `stop` trips; hands the listener back for release.
    pub fn run<D: DisplaySink + ?Sized>(
        self,
        ingestor: &Ingestor,
        display: &mut D,
        stop: &StopToken,
    ) -> Self {
        info!(port = self.port, "listening for sensor datagrams");
        let mut buf = [0u8; MAX_DATAGRAM];
        while !stop.is_stopped() {
            match self.socket.recv_from(&mut buf) {
                Ok((len, src)) => {
                    trace!(%src, len, "datagram");
                    ingestor.ingest(&buf[..len], display);
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) => {}
                Err(e) => {
                    if !stop.is_stopped() {
                        warn!(error = %e, "datagram receive failed");
                    }
                }
            }
        }
        debug!("ingress worker stopping");
        self
    }
}

use bridge_traits::OutputSink;
use midir::{MidiOutput, MidiOutputConnection};
use tracing::{debug, info, trace};

use crate::error::{HwError, Result};
use crate::ports::select_port;

const CLIENT_NAME: &str = "sensor-bridge";
const CONTROL_CHANGE: u8 = 0xB0;

/// MIDI output port sink.
pub struct MidiSink {
    conn: Option<MidiOutputConnection>,
    channel: u8,
    port_name: String,
}

impl MidiSink {
    /// Open the port matching `device` (or the automatic choice) on `channel`.
    pub fn open(device: Option<&str>, channel: u8) -> Result<Self> {
        let out = MidiOutput::new(CLIENT_NAME).map_err(|e| HwError::Open(e.to_string()))?;
        let ports = out.ports();
        let names: Vec<String> = ports
            .iter()
            .map(|p| out.port_name(p).unwrap_or_else(|_| "<unnamed>".to_string()))
            .collect();
        debug!(?names, "MIDI output ports");
        let idx = select_port(&names, device)?;
        let port_name = names[idx].clone();
        let conn = out
            .connect(&ports[idx], CLIENT_NAME)
            .map_err(|e| HwError::Open(format!("{port_name}: {e}")))?;
        info!(port = %port_name, channel, "MIDI output opened");
        Ok(Self {
            conn: Some(conn),
            channel: channel & 0x0F,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl OutputSink for MidiSink {
    fn send_control_change(
        &mut self,
        control: u8,
        value: u8,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let conn = self.conn.as_mut().ok_or(HwError::Closed)?;
        let msg = [CONTROL_CHANGE | self.channel, control & 0x7F, value & 0x7F];
        conn.send(&msg).map_err(|e| HwError::Send(e.to_string()))?;
        trace!(control, value, "control change");
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.conn.is_some()
    }

    fn close(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(conn) = self.conn.take() {
            let _ = conn.close();
            info!(port = %self.port_name, "MIDI output closed");
        }
        Ok(())
    }
}

//! Fixed-rate emission of control-change events.
//!
//! Each tick maps the filtered channel values onto the device range and
//! sends them. Primary and secondary are debounced against the last value
//! actually sent and only transmitted on change; the auxiliary channel is
//! sent every tick. Nothing is sent while input is timed out.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::OutputSink;
use bridge_traits::clock::Clock;
use tracing::{debug, info, trace, warn};

use crate::channel::{ChannelId, ChannelSet};
use crate::liveness::Liveness;
use crate::mapping::{debounce, to_device};
use crate::runner::StopToken;
use crate::sink_error::map_sink_error;
use crate::util::period_for_hz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TimedOut,
    SinkUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    Ran { sent: u32, failed: u32 },
}

pub struct OutputScheduler<S: OutputSink> {
    sink: S,
    channels: Arc<ChannelSet>,
    liveness: Arc<Liveness>,
    period: Duration,
    /// Last transmitted device value for primary and secondary. Owned here
    /// only; the ingress worker never sees it.
    last_sent: [Option<u8>; 2],
}

impl<S: OutputSink> OutputScheduler<S> {
    pub fn new(
        sink: S,
        channels: Arc<ChannelSet>,
        liveness: Arc<Liveness>,
        send_frequency_hz: f64,
    ) -> Self {
        Self {
            sink,
            channels,
            liveness,
            period: period_for_hz(send_frequency_hz),
            last_sent: [None, None],
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Last debounced value sent; always `None` for the auxiliary channel.
    pub fn last_sent(&self, id: ChannelId) -> Option<u8> {
        match id {
            ChannelId::Primary => self.last_sent[0],
            ChannelId::Secondary => self.last_sent[1],
            ChannelId::Auxiliary => None,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.liveness.evaluate();
        if self.liveness.is_timed_out() {
            return TickOutcome::Skipped(SkipReason::TimedOut);
        }
        if !self.sink.is_available() {
            return TickOutcome::Skipped(SkipReason::SinkUnavailable);
        }

        let (mut sent, mut failed) = (0, 0);
        for (slot, id) in [(0, ChannelId::Primary), (1, ChannelId::Secondary)] {
            let ch = self.channels.get(id);
            let cfg = ch.config();
            if !cfg.enabled {
                continue;
            }
            let mapped = to_device(ch.filtered(), cfg.domain_min, cfg.domain_max);
            let value = debounce(self.last_sent[slot], mapped);
            if self.last_sent[slot] == Some(value) {
                continue;
            }
            if transmit(&mut self.sink, id, cfg.mapping_id, value) {
                self.last_sent[slot] = Some(value);
                sent += 1;
            } else {
                failed += 1;
            }
        }

        let aux = self.channels.get(ChannelId::Auxiliary);
        let cfg = aux.config();
        if cfg.enabled {
            let value = to_device(aux.filtered(), cfg.domain_min, cfg.domain_max);
            if transmit(&mut self.sink, ChannelId::Auxiliary, cfg.mapping_id, value) {
                sent += 1;
            } else {
                failed += 1;
            }
        }
        TickOutcome::Ran { sent, failed }
    }

    /// Tick until `stop` trips; hands the sink back for release.
    pub fn run<C: Clock + ?Sized>(mut self, clock: &C, stop: &StopToken) -> S {
        info!(period_us = self.period.as_micros() as u64, "output scheduler started");
        while !stop.is_stopped() {
            self.tick();
            clock.sleep(self.period);
        }
        debug!("output worker stopping");
        self.sink
    }
}

fn transmit<S: OutputSink>(sink: &mut S, id: ChannelId, control: u8, value: u8) -> bool {
    match sink.send_control_change(control, value) {
        Ok(()) => {
            trace!(channel = %id, control, value, "sent");
            true
        }
        Err(e) => {
            let err = map_sink_error(&*e);
            warn!(channel = %id, control, error = %err, "control change not sent");
            false
        }
    }
}

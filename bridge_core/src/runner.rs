//! Worker lifecycle: start the ingress and output threads, stop them, and
//! release what they owned.
//!
//! Each worker owns its resource (socket or sink) outright and hands it back
//! through its join handle, so nothing is shared except the channel set and
//! liveness record. Joining is bounded: a worker that does not finish within
//! the shutdown timeout is abandoned and reported, never waited on forever.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bridge_traits::clock::Clock;
use bridge_traits::{Discovery, DisplaySink, OutputSink, ServiceAdvert};
use crossbeam_channel as xch;
use eyre::WrapErr;

use crate::channel::ChannelSet;
use crate::conversions::BridgeSettings;
use crate::error::Result;
use crate::ingress::{Ingestor, IngressListener};
use crate::liveness::Liveness;
use crate::scheduler::OutputScheduler;
use crate::sink_error::map_sink_error;

/// How long `shutdown` waits for each worker by default.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Cooperative stop flag polled by both workers.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

enum Joined<T> {
    Finished(T),
    Panicked,
    Abandoned,
}

/// A named thread whose exit can be awaited with a deadline.
struct Worker<T> {
    name: &'static str,
    handle: JoinHandle<T>,
    // Disconnects when the thread body returns or unwinds.
    done: xch::Receiver<()>,
}

impl<T: Send + 'static> Worker<T> {
    fn spawn<F>(name: &'static str, body: F) -> std::io::Result<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (done_tx, done) = xch::bounded::<()>(0);
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            let _done = done_tx;
            body()
        })?;
        Ok(Self { name, handle, done })
    }

    fn join_within(self, timeout: Duration) -> Joined<T> {
        match self.done.recv_timeout(timeout) {
            Err(xch::RecvTimeoutError::Timeout) => Joined::Abandoned,
            Ok(()) | Err(xch::RecvTimeoutError::Disconnected) => match self.handle.join() {
                Ok(v) => Joined::Finished(v),
                Err(_) => Joined::Panicked,
            },
        }
    }
}

/// Everything the bridge needs, already opened by the caller.
pub struct BridgeParts<S, D> {
    pub listener: IngressListener,
    pub sink: S,
    pub display: D,
    pub settings: BridgeSettings,
    pub clock: Arc<dyn Clock + Send + Sync>,
    pub discovery: Option<(Box<dyn Discovery + Send>, ServiceAdvert)>,
}

/// Outcome of `Bridge::shutdown`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers still running when the deadline passed.
    pub abandoned: Vec<&'static str>,
    pub panicked: Vec<&'static str>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.abandoned.is_empty() && self.panicked.is_empty()
    }
}

/// A running bridge: two workers plus the state they share.
pub struct Bridge<S: OutputSink + Send + 'static> {
    stop: StopToken,
    channels: Arc<ChannelSet>,
    liveness: Arc<Liveness>,
    port: u16,
    ingress: Worker<IngressListener>,
    output: Worker<S>,
    discovery: Option<Box<dyn Discovery + Send>>,
}

impl<S: OutputSink + Send + 'static> Bridge<S> {
    /// Register discovery (best effort) and spawn both workers.
    pub fn start<D>(parts: BridgeParts<S, D>) -> Result<Self>
    where
        D: DisplaySink + Send + 'static,
    {
        let BridgeParts {
            listener,
            sink,
            mut display,
            settings,
            clock,
            discovery,
        } = parts;

        let channels = Arc::new(ChannelSet::new(settings.channels.clone()));
        let liveness = Arc::new(Liveness::new(Arc::clone(&clock)));
        let stop = StopToken::new();
        let port = listener.port();

        let discovery = discovery.and_then(|(mut d, advert)| match d.register(&advert) {
            Ok(()) => {
                tracing::info!(
                    service = %advert.service_type,
                    instance = %advert.instance_name,
                    address = %advert.address,
                    port = advert.port,
                    "service advertised"
                );
                Some(d)
            }
            Err(e) => {
                tracing::warn!(error = %e, "service advertisement failed; continuing without it");
                None
            }
        });

        let ingestor = Ingestor::new(
            Arc::clone(&channels),
            Arc::clone(&liveness),
            settings.display_mode,
        );
        let ingress_stop = stop.clone();
        let ingress = Worker::spawn("bridge-ingress", move || {
            listener.run(&ingestor, &mut display, &ingress_stop)
        })
        .wrap_err("spawning ingress worker")?;

        let scheduler = OutputScheduler::new(
            sink,
            Arc::clone(&channels),
            Arc::clone(&liveness),
            settings.send_frequency_hz,
        );
        let output_stop = stop.clone();
        let output = match Worker::spawn("bridge-output", move || {
            scheduler.run(&*clock, &output_stop)
        }) {
            Ok(w) => w,
            Err(e) => {
                stop.stop();
                let _ = ingress.join_within(DEFAULT_SHUTDOWN_TIMEOUT);
                return Err(e).wrap_err("spawning output worker");
            }
        };

        Ok(Self {
            stop,
            channels,
            liveness,
            port,
            ingress,
            output,
            discovery,
        })
    }

    /// Port the ingress socket is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn channels(&self) -> &Arc<ChannelSet> {
        &self.channels
    }

    pub fn liveness(&self) -> &Arc<Liveness> {
        &self.liveness
    }

    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Stop both workers, release the socket and sink, withdraw discovery.
    pub fn shutdown(self, timeout: Duration) -> ShutdownReport {
        let Self {
            stop,
            ingress,
            output,
            discovery,
            ..
        } = self;
        stop.stop();
        let mut report = ShutdownReport::default();

        let name = ingress.name;
        match ingress.join_within(timeout) {
            Joined::Finished(listener) => {
                tracing::debug!(port = listener.port(), "ingress socket released");
                drop(listener);
            }
            Joined::Panicked => report.panicked.push(name),
            Joined::Abandoned => report.abandoned.push(name),
        }

        let name = output.name;
        match output.join_within(timeout) {
            Joined::Finished(mut sink) => {
                if let Err(e) = sink.close() {
                    let err = map_sink_error(&*e);
                    tracing::warn!(error = %err, "closing output device failed");
                } else {
                    tracing::debug!("output device closed");
                }
            }
            Joined::Panicked => report.panicked.push(name),
            Joined::Abandoned => report.abandoned.push(name),
        }

        if let Some(mut d) = discovery {
            if let Err(e) = d.unregister() {
                tracing::warn!(error = %e, "withdrawing service advertisement failed");
            }
        }

        for w in &report.abandoned {
            tracing::warn!(worker = w, timeout_ms = timeout.as_millis() as u64, "worker did not stop in time; abandoned");
        }
        for w in &report.panicked {
            tracing::warn!(worker = w, "worker panicked");
        }
        if report.is_clean() {
            tracing::info!("bridge stopped");
        }
        report
    }
}

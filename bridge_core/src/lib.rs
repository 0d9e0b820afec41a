#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Sensor bridge engine (hardware-agnostic).
//!
//! Sensor samples arrive as UDP datagrams, are smoothed per channel, and are
//! emitted at a fixed rate as control-change events through
//! `bridge_traits::OutputSink`.
//!
//! ## Architecture
//!
//! - **Ingress**: datagram parsing and channel updates (`ingress` module)
//! - **Filtering**: lagged exponential smoothing (`filter` module)
//! - **Liveness**: one-second input timeout that freezes output (`liveness`)
//! - **Output**: mapping to `[0, 127]`, debounce, edge-triggered send (`scheduler`)
//! - **Lifecycle**: worker threads, bounded shutdown (`runner`)
//!
//! Channel state is the only thing the two workers share. The output worker
//! alone owns the sink and the record of what it last sent.

pub mod channel;
pub mod conversions;
pub mod error;
pub mod filter;
pub mod ingress;
pub mod liveness;
pub mod mapping;
pub mod mocks;
pub mod runner;
pub mod scheduler;
pub mod sink_error;
pub mod util;

pub use channel::{ChannelConfig, ChannelId, ChannelSet, ChannelState};
pub use conversions::{BridgeSettings, resolve_mapping};
pub use error::{BridgeError, Result};
pub use ingress::{IngestReport, Ingestor, IngressListener};
pub use liveness::{LIVENESS_TIMEOUT, Liveness, Transition};
pub use runner::{Bridge, BridgeParts, DEFAULT_SHUTDOWN_TIMEOUT, ShutdownReport, StopToken};
pub use scheduler::{OutputScheduler, SkipReason, TickOutcome};

//! Channel configuration and the per-channel runtime record shared between
//! the ingress and output workers.
//!
//! `ChannelConfig` is fixed after startup. `ChannelState` guards the mutable
//! reading (raw, filtered, filter history) behind one mutex per channel; only
//! the ingress worker writes it and only the output worker reads it.

use std::sync::{Mutex, MutexGuard};

use crate::filter::SmoothingFilter;

/// Logical sensor channel, in datagram field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Primary,
    Secondary,
    Auxiliary,
}

impl ChannelId {
    pub const ALL: [ChannelId; 3] = [Self::Primary, Self::Secondary, Self::Auxiliary];

    /// Position of this channel's value in a datagram.
    pub fn field_index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Auxiliary => 2,
        }
    }

    /// Name used in configuration files and log output.
    pub fn key(self) -> &'static str {
        match self {
            Self::Primary => "cc1",
            Self::Secondary => "cc11",
            Self::Auxiliary => "cc_opt",
        }
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    pub id: ChannelId,
    pub enabled: bool,
    /// Control identifier on the output device.
    pub mapping_id: u8,
    pub domain_min: f64,
    pub domain_max: f64,
    pub smoothing_enabled: bool,
    pub smoothing_coefficient: f64,
}

impl ChannelConfig {
    /// Clamp a sample into this channel's domain.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.domain_min, self.domain_max)
    }
}

/// Latest values of one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Last received sample, post-clamp.
    pub raw: f64,
    /// Filter output, or `raw` when smoothing is off.
    pub filtered: f64,
    filter: SmoothingFilter,
}

impl Reading {
    fn new(coefficient: f64) -> Self {
        Self {
            raw: 0.0,
            filtered: 0.0,
            filter: SmoothingFilter::new(coefficient),
        }
    }

    pub fn filter(&self) -> &SmoothingFilter {
        &self.filter
    }
}

#[derive(Debug)]
pub struct ChannelState {
    config: ChannelConfig,
    reading: Mutex<Reading>,
}

impl ChannelState {
    pub fn new(config: ChannelConfig) -> Self {
        let reading = Mutex::new(Reading::new(config.smoothing_coefficient));
        Self { config, reading }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    // Readings are plain scalars, so a poisoned lock still holds usable data.
    fn lock(&self) -> MutexGuard<'_, Reading> {
        match self.reading.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Clamp `value` into the domain and update raw/filtered.
    ///
    /// Returns the stored `(raw, filtered)` pair.
    pub fn ingest(&self, value: f64) -> (f64, f64) {
        let raw = self.config.clamp(value);
        let mut r = self.lock();
        r.raw = raw;
        r.filtered = if self.config.smoothing_enabled {
            r.filter.update(raw)
        } else {
            raw
        };
        (r.raw, r.filtered)
    }

    pub fn snapshot(&self) -> Reading {
        *self.lock()
    }

    pub fn filtered(&self) -> f64 {
        self.lock().filtered
    }
}

/// The three channels of one bridge.
#[derive(Debug)]
pub struct ChannelSet {
    primary: ChannelState,
    secondary: ChannelState,
    auxiliary: ChannelState,
}

impl ChannelSet {
    pub fn new(configs: [ChannelConfig; 3]) -> Self {
        let [primary, secondary, auxiliary] = configs;
        debug_assert_eq!(primary.id, ChannelId::Primary);
        debug_assert_eq!(secondary.id, ChannelId::Secondary);
        debug_assert_eq!(auxiliary.id, ChannelId::Auxiliary);
        Self {
            primary: ChannelState::new(primary),
            secondary: ChannelState::new(secondary),
            auxiliary: ChannelState::new(auxiliary),
        }
    }

    pub fn get(&self, id: ChannelId) -> &ChannelState {
        match id {
            ChannelId::Primary => &self.primary,
            ChannelId::Secondary => &self.secondary,
            ChannelId::Auxiliary => &self.auxiliary,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelState> {
        [&self.primary, &self.secondary, &self.auxiliary].into_iter()
    }
}

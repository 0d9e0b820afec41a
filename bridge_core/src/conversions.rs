//! `From` implementations bridging `bridge_config` types to `bridge_core` types.

use bridge_config::{Config, DEFAULT_MAPPING, DisplayMode, Mapping, SmoothMode};

use crate::channel::{ChannelConfig, ChannelId};
use crate::error::BridgeError;

/// Upper bound of the secondary and auxiliary input domains.
pub const SECONDARY_DOMAIN_MAX: f64 = 90.0;

/// Runtime settings of one bridge, derived from a loaded `Config`.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeSettings {
    /// Primary, secondary, auxiliary.
    pub channels: [ChannelConfig; 3],
    pub send_frequency_hz: f64,
    pub listen_port: u16,
    pub display_mode: DisplayMode,
}

impl BridgeSettings {
    pub fn channel(&self, id: ChannelId) -> &ChannelConfig {
        &self.channels[id.field_index()]
    }
}

/// Check the three control identifiers for collisions.
///
/// On any collision all three are replaced by the defaults and the conflict
/// is returned alongside.
pub fn resolve_mapping(m: &Mapping) -> ((u8, u8, u8), Option<BridgeError>) {
    if !m.has_conflict() {
        return ((m.cc1, m.cc11, m.cc_opt), None);
    }
    let err = BridgeError::MappingConflict {
        primary: m.cc1,
        secondary: m.cc11,
        auxiliary: m.cc_opt,
    };
    tracing::warn!(
        error = %err,
        fallback = ?DEFAULT_MAPPING,
        "control identifiers collide; using defaults"
    );
    (DEFAULT_MAPPING, Some(err))
}

impl From<&Config> for BridgeSettings {
    fn from(c: &Config) -> Self {
        let ctl = &c.controller;
        let ((cc1, cc11, cc_opt), _) = resolve_mapping(&c.mapping);
        if let Some(mode) = c.sensors.cc_opt.as_deref() {
            tracing::info!(mode, "sensors.cc_opt ignored; auxiliary channel is never smoothed");
        }

        let primary = ChannelConfig {
            id: ChannelId::Primary,
            enabled: ctl.cc1_enabled,
            mapping_id: cc1,
            domain_min: 0.0,
            domain_max: ctl.cc1_max,
            smoothing_enabled: c.sensors.cc1 == SmoothMode::Smooth,
            smoothing_coefficient: ctl.effective_aef_cc1(),
        };
        let secondary = ChannelConfig {
            id: ChannelId::Secondary,
            enabled: ctl.cc11_enabled,
            mapping_id: cc11,
            domain_min: 0.0,
            domain_max: SECONDARY_DOMAIN_MAX,
            smoothing_enabled: c.sensors.cc11 == SmoothMode::Smooth,
            smoothing_coefficient: ctl.effective_aef_cc11(),
        };
        let auxiliary = ChannelConfig {
            id: ChannelId::Auxiliary,
            enabled: ctl.cc_opt_enabled,
            mapping_id: cc_opt,
            domain_min: 0.0,
            domain_max: SECONDARY_DOMAIN_MAX,
            smoothing_enabled: false,
            smoothing_coefficient: ctl.aef,
        };

        Self {
            channels: [primary, secondary, auxiliary],
            send_frequency_hz: ctl.send_frequency,
            listen_port: ctl.listen_port,
            display_mode: c.display.para_monitor_display,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_documented_channel_layout() {
        let s = BridgeSettings::from(&Config::default());
        let p = s.channel(ChannelId::Primary);
        assert_eq!((p.mapping_id, p.domain_max, p.smoothing_enabled), (1, 30.0, true));
        let sec = s.channel(ChannelId::Secondary);
        assert_eq!((sec.mapping_id, sec.domain_max, sec.smoothing_enabled), (11, 90.0, false));
        let aux = s.channel(ChannelId::Auxiliary);
        assert!(!aux.enabled);
        assert_eq!(aux.mapping_id, 3);
        assert_eq!(s.listen_port, 8081);
        assert_eq!(s.display_mode, DisplayMode::Text);
    }

    #[test]
    fn per_channel_coefficient_overrides_global() {
        let mut cfg = Config::default();
        cfg.controller.aef = 0.3;
        cfg.controller.aef_cc11 = Some(0.7);
        let s = BridgeSettings::from(&cfg);
        assert_eq!(s.channel(ChannelId::Primary).smoothing_coefficient, 0.3);
        assert_eq!(s.channel(ChannelId::Secondary).smoothing_coefficient, 0.7);
    }

    #[test]
    fn collision_with_disabled_channel_still_resets() {
        let m = Mapping {
            cc1: 7,
            cc11: 11,
            cc_opt: 7,
        };
        let (ids, err) = resolve_mapping(&m);
        assert_eq!(ids, DEFAULT_MAPPING);
        assert!(matches!(err, Some(BridgeError::MappingConflict { primary: 7, .. })));
    }

    #[test]
    fn distinct_ids_are_kept() {
        let m = Mapping {
            cc1: 2,
            cc11: 4,
            cc_opt: 6,
        };
        assert_eq!(resolve_mapping(&m), ((2, 4, 6), None));
    }
}

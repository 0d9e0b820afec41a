//! Domain-to-device value mapping and output debouncing.

/// Largest value a control-change event can carry.
pub const DEVICE_MAX: u8 = 127;

/// Linear interpolation of `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// No clamping; callers clamp after rounding.
#[inline]
pub fn map_value(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Map a domain value onto the device range `[0, 127]`.
///
/// Rounds half to even, then clamps. Non-finite intermediates (degenerate
/// domain or NaN input) map to 0.
#[inline]
pub fn to_device(value: f64, domain_min: f64, domain_max: f64) -> u8 {
    let mapped = map_value(value, domain_min, domain_max, 0.0, f64::from(DEVICE_MAX));
    if !mapped.is_finite() {
        return 0;
    }
    mapped.round_ties_even().clamp(0.0, f64::from(DEVICE_MAX)) as u8
}

/// Average the new device value with the last transmitted one (floor).
///
/// With no previous transmission the mapped value passes through.
#[inline]
pub fn debounce(last_sent: Option<u8>, mapped: u8) -> u8 {
    match last_sent {
        Some(last) => ((u16::from(last) + u16::from(mapped)) / 2) as u8,
        None => mapped,
    }
}

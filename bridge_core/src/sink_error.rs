//! Maps `Box<dyn Error>` from trait boundaries to typed `BridgeError`.
//!
//! The traits in `bridge_traits` use `Box<dyn Error + Send + Sync>`; this
//! module converts those to our typed error enum, with an optional
//! feature-gated path for `bridge_hardware::HwError` downcasting.

use crate::error::BridgeError;

/// Map an output-sink error to a typed `BridgeError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_sink_error(e: &(dyn std::error::Error + 'static)) -> BridgeError {
    #[cfg(feature = "hardware-errors")]
    {
        use bridge_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::NoPorts | HwError::PortNotFound(_) | HwError::Open(_) => {
                    BridgeError::DeviceOpen(hw.to_string())
                }
                other => BridgeError::DeviceSend(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("open") {
        BridgeError::DeviceOpen(s)
    } else {
        BridgeError::DeviceSend(s)
    }
}

//! Human-readable error descriptions for startup failures.

use bridge_core::BridgeError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BridgeError>() {
        return match be {
            BridgeError::NetworkBind { port, reason } => format!(
                "What happened: Could not listen on UDP port {port} ({reason}).\nLikely causes: Another program or a second bridge instance already uses the port, or the port needs elevated privileges.\nHow to fix: Stop the other program, or pass a free port as the first argument (e.g., `sensor-bridge 9000`) or set controller.listen_port."
            ),
            BridgeError::DeviceOpen(msg) => format!(
                "What happened: The MIDI output could not be opened ({msg}).\nLikely causes: No MIDI device or virtual port is present, its driver is missing, or another program holds the port.\nHow to fix: Connect the device and check its driver, close programs using the port, or set output.device to another port name. Running with elevated privileges can also help."
            ),
            BridgeError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with RUST_LOG=debug for more detail."
            ),
        };
    }

    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with RUST_LOG=debug for details. Original: {msg}"
    )
}

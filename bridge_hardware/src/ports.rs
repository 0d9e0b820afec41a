//! Output port choice policy, independent of the MIDI backend.

use crate::error::{HwError, Result};

/// Built-in Windows synth; usable, but not a real instrument.
pub const GS_WAVETABLE: &str = "Microsoft GS Wavetable Synth";

/// Pick an output port index from `names`.
///
/// With `wanted`, an exact name match wins over the first substring match.
/// Without it, the first port that is not the GS wavetable synth is used,
/// and the synth only when it is the sole choice.
pub fn select_port(names: &[String], wanted: Option<&str>) -> Result<usize> {
    if names.is_empty() {
        return Err(HwError::NoPorts);
    }
    if let Some(w) = wanted {
        if let Some(i) = names.iter().position(|n| n == w) {
            return Ok(i);
        }
        return names
            .iter()
            .position(|n| n.contains(w))
            .ok_or_else(|| HwError::PortNotFound(w.to_string()));
    }
    if let Some(i) = names.iter().position(|n| !n.contains(GS_WAVETABLE)) {
        return Ok(i);
    }
    tracing::warn!(
        port = %names[0],
        "only the GS wavetable synth is available; it is not a real sound source"
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_list_is_an_error() {
        assert!(matches!(select_port(&[], None), Err(HwError::NoPorts)));
    }

    #[test]
    fn skips_wavetable_synth_by_default() {
        let ports = names(&[GS_WAVETABLE, "loopMIDI Port 1", "USB Keys"]);
        assert_eq!(select_port(&ports, None).unwrap(), 1);
    }

    #[test]
    fn falls_back_to_synth_when_alone() {
        let ports = names(&[GS_WAVETABLE]);
        assert_eq!(select_port(&ports, None).unwrap(), 0);
    }

    #[test]
    fn exact_match_beats_substring() {
        let ports = names(&["loopMIDI Port 10", "loopMIDI Port 1"]);
        assert_eq!(select_port(&ports, Some("loopMIDI Port 1")).unwrap(), 1);
        assert_eq!(select_port(&ports, Some("Port 10")).unwrap(), 0);
    }

    #[test]
    fn unknown_name_reports_it() {
        let ports = names(&["USB Keys"]);
        match select_port(&ports, Some("IAC")) {
            Err(HwError::PortNotFound(n)) => assert_eq!(n, "IAC"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}

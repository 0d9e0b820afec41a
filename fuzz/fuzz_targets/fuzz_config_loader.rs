#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Any text must either fail to parse or yield settings within bounds.
    if let Ok(cfg) = bridge_config::load_toml(data) {
        if cfg.validate().is_ok() {
            let s = bridge_core::BridgeSettings::from(&cfg);
            let ids: Vec<u8> = s.channels.iter().map(|c| c.mapping_id).collect();
            assert!(ids[0] != ids[1] && ids[0] != ids[2] && ids[1] != ids[2]);
        }
    }
});

#![no_main]
use std::sync::Arc;

use bridge_config::Config;
use bridge_core::mocks::RecordingDisplay;
use bridge_core::{BridgeSettings, ChannelId, ChannelSet, Ingestor, Liveness};
use bridge_traits::clock::test_clock::TestClock;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut cfg = Config::default();
    cfg.controller.cc_opt_enabled = true;
    let settings = BridgeSettings::from(&cfg);
    let channels = Arc::new(ChannelSet::new(settings.channels.clone()));
    let liveness = Arc::new(Liveness::new(Arc::new(TestClock::new())));
    let ingestor = Ingestor::new(Arc::clone(&channels), liveness, settings.display_mode);
    let mut display = RecordingDisplay::new();

    ingestor.ingest(data, &mut display);

    // Stored values never leave their domain, whatever arrived.
    for id in ChannelId::ALL {
        let ch = channels.get(id);
        let r = ch.snapshot();
        let cfg = ch.config();
        assert!(r.raw >= cfg.domain_min && r.raw <= cfg.domain_max);
        assert!(r.filtered.is_finite());
    }
});

//! Ingestion through output on one thread, driven by a manual clock.

use std::sync::Arc;
use std::time::Duration;

use bridge_config::{Config, DisplayMode, SmoothMode};
use bridge_core::mocks::{RecordingDisplay, RecordingSink};
use bridge_core::{
    BridgeSettings, ChannelId, ChannelSet, Ingestor, Liveness, OutputScheduler, SkipReason,
    TickOutcome, Transition,
};
use bridge_traits::DisplayEvent;
use bridge_traits::clock::test_clock::TestClock;
use rstest::rstest;

struct Rig {
    clock: TestClock,
    channels: Arc<ChannelSet>,
    liveness: Arc<Liveness>,
    ingestor: Ingestor,
    scheduler: OutputScheduler<RecordingSink>,
    sink: RecordingSink,
    display: RecordingDisplay,
}

impl Rig {
    fn new(cfg: &Config) -> Self {
        Self::with_sink(cfg, RecordingSink::new())
    }

    fn with_sink(cfg: &Config, sink: RecordingSink) -> Self {
        let settings = BridgeSettings::from(cfg);
        let clock = TestClock::new();
        let channels = Arc::new(ChannelSet::new(settings.channels.clone()));
        let liveness = Arc::new(Liveness::new(Arc::new(clock.clone())));
        let ingestor = Ingestor::new(
            Arc::clone(&channels),
            Arc::clone(&liveness),
            settings.display_mode,
        );
        let scheduler = OutputScheduler::new(
            sink.clone(),
            Arc::clone(&channels),
            Arc::clone(&liveness),
            settings.send_frequency_hz,
        );
        Self {
            clock,
            channels,
            liveness,
            ingestor,
            scheduler,
            sink,
            display: RecordingDisplay::new(),
        }
    }

    fn feed(&mut self, text: &str) -> bridge_core::IngestReport {
        self.ingestor.ingest(text.as_bytes(), &mut self.display)
    }

    fn raw(&self, id: ChannelId) -> f64 {
        self.channels.get(id).snapshot().raw
    }
}

fn passthrough() -> Config {
    let mut cfg = Config::default();
    cfg.sensors.cc1 = SmoothMode::Passthrough;
    cfg.sensors.cc11 = SmoothMode::Passthrough;
    cfg
}

#[test]
fn three_field_datagram_updates_every_channel_and_resets_liveness() {
    let mut cfg = Config::default();
    cfg.controller.cc_opt_enabled = true;
    let mut rig = Rig::new(&cfg);

    rig.clock.advance(Duration::from_millis(700));
    let report = rig.feed("12.5 40.0 1.0");

    assert!(report.failures.is_empty());
    assert_eq!(rig.raw(ChannelId::Primary), 12.5);
    assert_eq!(rig.raw(ChannelId::Secondary), 40.0);
    assert_eq!(rig.raw(ChannelId::Auxiliary), 1.0);
    assert_eq!(rig.liveness.silent_for_ms(), 0);
    assert_eq!(
        rig.display.events(),
        vec![DisplayEvent::Sample {
            primary: Some(12.5),
            secondary: Some(40.0),
            auxiliary: Some(1.0),
        }]
    );
}

#[test]
fn smoothing_lags_by_one_sample() {
    let mut cfg = Config::default();
    cfg.controller.aef_cc1 = Some(0.5);
    let mut rig = Rig::new(&cfg);

    let mut filtered = Vec::new();
    for raw in ["10", "20", "30"] {
        rig.feed(raw);
        filtered.push(rig.channels.get(ChannelId::Primary).filtered());
    }
    assert_eq!(filtered, vec![0.0, 5.0, 12.5]);
}

#[test]
fn out_of_domain_sample_is_clamped_before_filtering() {
    let mut rig = Rig::new(&Config::default());
    rig.feed("999");
    assert_eq!(rig.raw(ChannelId::Primary), 30.0);
    let snap = rig.channels.get(ChannelId::Primary).snapshot();
    assert_eq!(snap.filter().prev_raw(), 30.0);
}

#[test]
fn unchanged_value_is_sent_once() {
    let mut rig = Rig::new(&passthrough());
    rig.feed("15 45");

    assert_eq!(rig.scheduler.tick(), TickOutcome::Ran { sent: 2, failed: 0 });
    assert_eq!(rig.scheduler.tick(), TickOutcome::Ran { sent: 0, failed: 0 });
    assert_eq!(rig.sink.sent(), vec![(1, 64), (11, 64)]);
    assert_eq!(rig.scheduler.last_sent(ChannelId::Primary), Some(64));
}

#[test]
fn step_change_is_approached_by_halving_and_settles_one_short() {
    let mut rig = Rig::new(&passthrough());
    rig.feed("15");
    rig.scheduler.tick();
    rig.feed("30");
    for _ in 0..12 {
        rig.scheduler.tick();
    }
    assert_eq!(rig.sink.values_for(1), vec![64, 95, 111, 119, 123, 125, 126]);
}

#[test]
fn nothing_is_sent_while_timed_out() {
    let mut rig = Rig::new(&passthrough());
    rig.feed("15 45");
    rig.clock.advance(Duration::from_millis(1001));

    for _ in 0..5 {
        assert_eq!(
            rig.scheduler.tick(),
            TickOutcome::Skipped(SkipReason::TimedOut)
        );
    }
    assert!(rig.sink.sent().is_empty());
    assert_eq!(rig.scheduler.last_sent(ChannelId::Primary), None);

    // Samples are still ingested but not displayed while timed out.
    rig.feed("30 90");
    assert_eq!(rig.display.events().len(), 1);
    assert!(matches!(rig.scheduler.tick(), TickOutcome::Ran { sent: 2, .. }));
    assert_eq!(rig.sink.sent(), vec![(1, 127), (11, 127)]);
}

#[test]
fn liveness_reports_each_boundary_once() {
    let rig = Rig::new(&Config::default());
    let mut events = Vec::new();
    for _ in 0..30 {
        rig.clock.advance(Duration::from_millis(100));
        events.extend(rig.liveness.evaluate());
    }
    rig.liveness.touch();
    for _ in 0..5 {
        events.extend(rig.liveness.evaluate());
    }
    assert_eq!(events, vec![Transition::TimedOut, Transition::Recovered]);
}

#[test]
fn failing_channel_does_not_block_the_others() {
    let mut rig = Rig::with_sink(&passthrough(), RecordingSink::failing_on(1));
    rig.feed("15 45");
    assert_eq!(rig.scheduler.tick(), TickOutcome::Ran { sent: 1, failed: 1 });
    assert_eq!(rig.scheduler.last_sent(ChannelId::Primary), None);
    assert_eq!(rig.scheduler.last_sent(ChannelId::Secondary), Some(64));
}

#[test]
fn unavailable_sink_skips_tick() {
    let mut rig = Rig::new(&passthrough());
    rig.feed("15 45");
    rig.sink.set_available(false);
    assert_eq!(
        rig.scheduler.tick(),
        TickOutcome::Skipped(SkipReason::SinkUnavailable)
    );
    rig.sink.set_available(true);
    assert!(matches!(rig.scheduler.tick(), TickOutcome::Ran { sent: 2, .. }));
}

#[test]
fn auxiliary_is_sent_every_tick() {
    let mut cfg = passthrough();
    cfg.controller.cc_opt_enabled = true;
    let mut rig = Rig::new(&cfg);
    rig.feed("0 0 45");
    for _ in 0..3 {
        rig.scheduler.tick();
    }
    assert_eq!(rig.sink.values_for(3), vec![64, 64, 64]);
    assert_eq!(rig.sink.values_for(1), vec![0]);
}

#[test]
fn bad_field_is_skipped_without_losing_the_rest() {
    let mut rig = Rig::new(&passthrough());
    let report = rig.feed("abc 40");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.value(ChannelId::Secondary), Some(40.0));
    assert_eq!(rig.raw(ChannelId::Primary), 0.0);
    assert_eq!(
        rig.display.events(),
        vec![DisplayEvent::Sample {
            primary: None,
            secondary: Some(40.0),
            auxiliary: None,
        }]
    );
}

#[test]
fn wholly_malformed_datagram_leaves_liveness_alone() {
    let mut rig = Rig::new(&Config::default());
    rig.clock.advance(Duration::from_millis(400));
    let report = rig.feed("abc def");
    assert!(!report.any_parsed());
    assert_eq!(rig.liveness.silent_for_ms(), 400);
    assert_eq!(
        rig.display.events(),
        vec![DisplayEvent::Malformed("abc def".to_string())]
    );
}

#[test]
fn fields_of_disabled_channels_are_ignored() {
    let mut cfg = Config::default();
    cfg.controller.cc11_enabled = false;
    cfg.display.para_monitor_display = DisplayMode::Off;
    let mut rig = Rig::new(&cfg);
    let report = rig.feed("1 xyz");
    assert!(report.failures.is_empty());
    assert_eq!(report.value(ChannelId::Secondary), None);
    assert!(rig.display.events().is_empty());
}

#[test]
fn empty_datagram_is_ignored() {
    let mut rig = Rig::new(&Config::default());
    rig.clock.advance(Duration::from_millis(300));
    let report = rig.feed("  \n");
    assert!(report.failures.is_empty() && !report.any_parsed());
    assert_eq!(rig.liveness.silent_for_ms(), 300);
    assert!(rig.display.events().is_empty());
}

#[rstest]
#[case((5, 5, 3), (1, 11, 3))]
#[case((1, 2, 2), (1, 11, 3))]
#[case((9, 10, 9), (1, 11, 3))]
#[case((20, 21, 22), (20, 21, 22))]
fn mapping_collisions_fall_back_to_defaults(
    #[case] ids: (u8, u8, u8),
    #[case] expected: (u8, u8, u8),
) {
    let mut cfg = Config::default();
    (cfg.mapping.cc1, cfg.mapping.cc11, cfg.mapping.cc_opt) = ids;
    let s = BridgeSettings::from(&cfg);
    let got = (
        s.channel(ChannelId::Primary).mapping_id,
        s.channel(ChannelId::Secondary).mapping_id,
        s.channel(ChannelId::Auxiliary).mapping_id,
    );
    assert_eq!(got, expected);
}

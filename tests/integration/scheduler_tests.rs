//! Integration tests for the wake service: counter → policy → FSM → ports.
//!
//! Each `run_wake` call stands for one boot.  Only the retained store is
//! carried between calls, exactly as RTC memory is on the device.

use super::mock_board::{CameraCall, MockBoard, RecordingSink, test_config};

use camkeeper::adapters::retained::RtcRetainedStore;
use camkeeper::app::events::WakeEvent;
use camkeeper::app::ports::RetainedStore;
use camkeeper::app::service::WakeService;
use camkeeper::config::{IntervalConfig, TimingConfig};
use camkeeper::cycle::PersistentState;
use camkeeper::error::CameraError;
use camkeeper::fsm::StateId;
use camkeeper::fsm::context::KeepAliveStrategy;
use camkeeper::policy::WakeClassification;
use camkeeper::power::WakeReason;
use camkeeper::sequencer::PhotoOutcome;

fn seeded_store(total_wake_count: u32, wakes_since_last_photo: u32) -> RtcRetainedStore {
    let mut store = RtcRetainedStore::new_simulated();
    store.store(&PersistentState {
        total_wake_count,
        wakes_since_last_photo,
    });
    store
}

// ── First boot ────────────────────────────────────────────────

#[test]
fn first_boot_takes_photo_then_sleeps() {
    let mut service = WakeService::new(test_config());
    let mut store = RtcRetainedStore::new_simulated();
    let mut mb = MockBoard::new().with_wake_reason(WakeReason::PowerOn);
    let mut sink = RecordingSink::default();

    let report = service.run_wake(&mut mb.board(), &mut store, &mut sink);

    let tally = report.tally.expect("wake counted");
    assert!(tally.first_boot);
    assert_eq!(tally.total_wake_count, 1);
    assert_eq!(report.reason, WakeReason::PowerOn);
    assert_eq!(report.classification, Some(WakeClassification::PhotoWake));
    assert_eq!(report.keep_alive, None);
    assert_eq!(
        report.photo.map(|p| p.outcome),
        Some(PhotoOutcome::Uploaded { status: 200 })
    );
    assert_eq!(report.sleep_secs, 90);
    assert_eq!(report.final_state, StateId::Suspending);
    assert_eq!(mb.power.last_sleep_secs(), Some(90));
    assert!(!mb.radio.is_powered());

    assert_eq!(
        store.load(),
        Some(PersistentState {
            total_wake_count: 1,
            wakes_since_last_photo: 0
        })
    );
}

#[test]
fn first_boot_event_trail() {
    let mut service = WakeService::new(test_config());
    let mut store = RtcRetainedStore::new_simulated();
    let mut mb = MockBoard::new();
    let mut sink = RecordingSink::default();

    service.run_wake(&mut mb.board(), &mut store, &mut sink);

    assert!(matches!(sink.events.first(), Some(WakeEvent::Booted { .. })));
    assert!(matches!(
        sink.events.last(),
        Some(WakeEvent::Suspending { duration_secs: 90 })
    ));

    let transitions: Vec<(StateId, StateId)> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            WakeEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (StateId::Booting, StateId::Classifying),
            (StateId::Classifying, StateId::RunningPhotoSequence),
            (StateId::RunningPhotoSequence, StateId::Suspending),
        ]
    );

    let classified = sink
        .events
        .iter()
        .filter(|e| matches!(e, WakeEvent::Classified { .. }))
        .count();
    assert_eq!(classified, 1);
}

#[test]
fn garbage_rtc_memory_counts_as_first_boot() {
    let mut service = WakeService::new(test_config());
    let mut store = RtcRetainedStore::from_blob([0xAA; 32]);
    let mut mb = MockBoard::new();

    let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());

    assert_eq!(report.tally.map(|t| t.first_boot), Some(true));
    assert_eq!(report.classification, Some(WakeClassification::PhotoWake));
}

// ── Cadence ───────────────────────────────────────────────────

#[test]
fn photo_every_forty_wakes_with_default_intervals() {
    let mut service = WakeService::new(test_config());
    let mut store = RtcRetainedStore::new_simulated();

    let mut photo_wakes = Vec::new();
    for wake in 1..=81u32 {
        let mut mb = MockBoard::new();
        let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());

        assert_eq!(report.final_state, StateId::Suspending, "wake {}", wake);
        assert_eq!(mb.power.last_sleep_secs(), Some(90), "wake {}", wake);
        match report.classification {
            Some(WakeClassification::PhotoWake) => {
                assert!(report.photo.is_some());
                photo_wakes.push(wake);
            }
            Some(WakeClassification::KeepAliveWake) => {
                assert_eq!(report.keep_alive, Some(KeepAliveStrategy::FlashPulse));
                assert!(mb.camera.calls.is_empty());
            }
            None => panic!("wake {} was not classified", wake),
        }
    }

    assert_eq!(photo_wakes, vec![1, 41, 81]);
    assert_eq!(store.load().map(|s| s.total_wake_count), Some(81));
}

#[test]
fn uneven_intervals_round_up() {
    let mut config = test_config();
    // 100 / 30 → 4 wakes, never 3.
    config.intervals = IntervalConfig::new(100, 30);
    let mut service = WakeService::new(config);
    let mut store = seeded_store(10, 3);

    let report = service.run_wake(&mut MockBoard::new().board(), &mut store, &mut RecordingSink::default());

    assert_eq!(report.classification, Some(WakeClassification::PhotoWake));
    assert_eq!(report.sleep_secs, 30);
}

// ── Keep-alive ────────────────────────────────────────────────

#[test]
fn keep_alive_wake_pulses_flash() {
    let mut service = WakeService::new(test_config());
    let mut store = seeded_store(5, 3);
    let mut mb = MockBoard::new();

    let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());

    assert_eq!(report.classification, Some(WakeClassification::KeepAliveWake));
    assert_eq!(report.keep_alive, Some(KeepAliveStrategy::FlashPulse));
    assert_eq!(mb.flash.intensities, vec![255, 0]);
    let t = TimingConfig::default();
    assert_eq!(
        mb.delay.total_ms(),
        u64::from(t.keep_alive_flash_ms + t.keep_alive_pause_ms + t.log_flush_ms)
    );
    assert!(mb.camera.calls.is_empty());
    assert!(mb.http.requests().is_empty());
    assert_eq!(
        store.load(),
        Some(PersistentState {
            total_wake_count: 6,
            wakes_since_last_photo: 4
        })
    );
}

#[test]
fn keep_alive_without_flash_pulses_radio() {
    let mut config = test_config();
    config.capabilities.has_flash_led = false;
    let mut service = WakeService::new(config);
    let mut store = seeded_store(5, 3);
    let mut mb = MockBoard::new();

    let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());

    assert_eq!(report.keep_alive, Some(KeepAliveStrategy::RadioPulse));
    assert!(mb.flash.intensities.is_empty());
    let t = TimingConfig::default();
    assert_eq!(
        mb.delay.total_ms(),
        u64::from(t.keep_alive_radio_ms + t.keep_alive_pause_ms + t.log_flush_ms)
    );
    assert!(!mb.radio.is_powered());
}

#[test]
fn flash_failure_falls_back_to_radio_pulse() {
    let mut service = WakeService::new(test_config());
    let mut store = seeded_store(5, 3);
    let mut mb = MockBoard::new();
    mb.flash.fail_configure = true;

    let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());

    assert_eq!(report.keep_alive, Some(KeepAliveStrategy::RadioPulse));
    assert_eq!(mb.flash.configure_calls, 1);
    assert!(mb.flash.intensities.is_empty());
    assert_eq!(report.final_state, StateId::Suspending);
}

// ── Failed photo attempts ─────────────────────────────────────

#[test]
fn camera_init_failure_still_resets_counter() {
    let mut service = WakeService::new(test_config());
    let mut store = seeded_store(100, 39);

    let mut mb = MockBoard::new();
    mb.camera.init_error = Some(CameraError::InitFailed(-1));
    let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());

    assert_eq!(report.classification, Some(WakeClassification::PhotoWake));
    assert_eq!(
        report.photo.map(|p| p.outcome),
        Some(PhotoOutcome::CameraInitFailed(CameraError::InitFailed(-1)))
    );
    assert_eq!(mb.power.last_sleep_secs(), Some(90));
    assert_eq!(
        store.load(),
        Some(PersistentState {
            total_wake_count: 101,
            wakes_since_last_photo: 0
        })
    );

    // The next wake is an ordinary keep-alive.
    let mut mb = MockBoard::new();
    let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());
    assert_eq!(report.classification, Some(WakeClassification::KeepAliveWake));
    assert_eq!(report.tally.map(|t| t.wakes_since_last_photo), Some(1));
    assert_eq!(mb.camera.count(CameraCall::Init), 0);
}

#[test]
fn consecutive_photo_wakes_each_reset_counter() {
    let mut config = test_config();
    // One wake per photo: every wake is a photo wake.
    config.intervals = IntervalConfig::new(90, 90);
    let mut service = WakeService::new(config);
    let mut store = RtcRetainedStore::new_simulated();

    let mut mb = MockBoard::new();
    let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());
    assert_eq!(
        report.photo.map(|p| p.outcome),
        Some(PhotoOutcome::Uploaded { status: 200 })
    );
    assert_eq!(store.load().map(|s| s.wakes_since_last_photo), Some(0));

    let mut mb = MockBoard::new();
    mb.camera.init_error = Some(CameraError::InitFailed(-1));
    let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());
    assert_eq!(report.classification, Some(WakeClassification::PhotoWake));
    assert_eq!(
        report.photo.map(|p| p.outcome),
        Some(PhotoOutcome::CameraInitFailed(CameraError::InitFailed(-1)))
    );
    assert_eq!(
        store.load(),
        Some(PersistentState {
            total_wake_count: 2,
            wakes_since_last_photo: 0
        })
    );
}

#[test]
fn photo_wake_without_flash_leaves_led_alone() {
    let mut config = test_config();
    config.capabilities.has_flash_led = false;
    let mut service = WakeService::new(config);
    let mut store = RtcRetainedStore::new_simulated();
    let mut mb = MockBoard::new();

    let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());

    assert_eq!(report.classification, Some(WakeClassification::PhotoWake));
    assert_eq!(mb.flash.configure_calls, 0);
    assert!(mb.flash.intensities.is_empty());
    assert_eq!(mb.power.last_sleep_secs(), Some(90));
}

#[test]
fn radio_timeout_wake_still_sleeps() {
    let mut service = WakeService::new(test_config());
    let mut store = RtcRetainedStore::new_simulated();
    let mut mb = MockBoard::new().with_radio(None);

    let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());

    assert_eq!(
        report.photo.map(|p| p.outcome),
        Some(PhotoOutcome::RadioTimeout { attempts: 20 })
    );
    let t = TimingConfig::default();
    assert_eq!(
        mb.delay.total_ms(),
        u64::from(t.sensor_settle_ms + t.flash_settle_ms + t.log_flush_ms) + t.radio_timeout_ms()
    );
    assert_eq!(mb.power.last_sleep_secs(), Some(90));
    assert!(!mb.radio.is_powered());
    assert_eq!(store.load().map(|s| s.wakes_since_last_photo), Some(0));
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn invalid_intervals_fall_back_to_defaults() {
    let mut config = test_config();
    config.intervals = IntervalConfig::new(3600, 0);
    let service = WakeService::new(config);
    assert_eq!(service.config().intervals, IntervalConfig::default());
}

#[test]
fn sleep_uses_configured_keep_alive_interval() {
    let mut config = test_config();
    config.intervals = IntervalConfig::new(600, 60);
    let mut service = WakeService::new(config);
    let mut store = seeded_store(2, 1);
    let mut mb = MockBoard::new();

    let report = service.run_wake(&mut mb.board(), &mut store, &mut RecordingSink::default());

    assert_eq!(report.sleep_secs, 60);
    assert_eq!(mb.power.last_sleep_secs(), Some(60));
}

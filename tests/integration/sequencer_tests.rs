//! Integration tests for the capture-and-upload sequence.
//!
//! Drive `CaptureSequencer` against the mock board and check what reached
//! the camera, the flash, the radio and the HTTP client.

use super::mock_board::{CameraCall, MockBoard, UPLOAD_URL, test_config};

use camkeeper::app::ports::HttpResponse;
use camkeeper::drivers::camera::{FrameSize, MemoryClass};
use camkeeper::error::{CameraError, Error, UploadError};
use camkeeper::sensors::ClimateReading;
use camkeeper::sequencer::{CaptureSequencer, HEADER_HUMIDITY, HEADER_TEMPERATURE, PhotoOutcome};

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn uploads_jpeg_with_climate_headers() {
    let config = test_config();
    let mut mb = MockBoard::new();

    let report = CaptureSequencer::new(&config).run(&mut mb.board());

    assert_eq!(report.outcome, PhotoOutcome::Uploaded { status: 200 });
    assert_eq!(report.frame_len, Some(mb.camera.jpeg.len()));
    assert_eq!(report.radio_attempts, Some(3));
    assert!(report.errors().is_empty());

    let requests = mb.http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, UPLOAD_URL);
    assert_eq!(requests[0].body_len, mb.camera.jpeg.len());
    assert_eq!(header(&requests[0].headers, "Content-Type"), Some("image/jpeg"));
    assert_eq!(header(&requests[0].headers, HEADER_TEMPERATURE), Some("23.4"));
    assert_eq!(header(&requests[0].headers, HEADER_HUMIDITY), Some("55.0"));
}

#[test]
fn camera_lifecycle_is_complete() {
    let config = test_config();
    let mut mb = MockBoard::new();

    CaptureSequencer::new(&config).run(&mut mb.board());

    assert_eq!(
        mb.camera.calls,
        vec![
            CameraCall::Init,
            CameraCall::Orientation {
                vertical_flip: true,
                horizontal_mirror: true
            },
            CameraCall::Capture,
            CameraCall::Release,
            CameraCall::Deinit,
        ]
    );
    // Flash on for the exposure, off afterwards.
    assert_eq!(mb.flash.intensities, vec![200, 0]);
    assert!(mb.climate.begun);
    assert_eq!(mb.climate.reads, 1);
}

#[test]
fn profile_follows_memory_class() {
    let config = test_config();

    let mut psram = MockBoard::new();
    let report = CaptureSequencer::new(&config).run(&mut psram.board());
    assert_eq!(report.profile.frame_size, FrameSize::Svga);

    let mut dram = MockBoard::new().with_memory(MemoryClass::Internal);
    let report = CaptureSequencer::new(&config).run(&mut dram.board());
    assert_eq!(report.profile.frame_size, FrameSize::Vga);
    assert_eq!(dram.camera.profile.map(|p| p.fb_count), Some(1));
}

#[test]
fn board_without_flash_never_touches_it() {
    let mut config = test_config();
    config.capabilities.has_flash_led = false;
    let mut mb = MockBoard::new();

    let report = CaptureSequencer::new(&config).run(&mut mb.board());

    assert_eq!(report.outcome, PhotoOutcome::Uploaded { status: 200 });
    assert_eq!(mb.flash.configure_calls, 0);
    assert!(mb.flash.intensities.is_empty());
    // The exposure settle still happens.
    let timing = config.timing;
    assert_eq!(
        mb.delay.total_ms(),
        u64::from(timing.sensor_settle_ms + timing.flash_settle_ms + 2 * timing.radio_poll_interval_ms)
    );
}

// ── Climate ───────────────────────────────────────────────────

#[test]
fn invalid_reading_omits_headers_but_still_uploads() {
    let config = test_config();
    let mut mb = MockBoard::new();
    mb.climate.reading = ClimateReading::INVALID;

    let report = CaptureSequencer::new(&config).run(&mut mb.board());

    assert_eq!(report.outcome, PhotoOutcome::Uploaded { status: 200 });
    let headers = &mb.http.requests()[0].headers;
    assert_eq!(headers.len(), 1);
    assert_eq!(header(headers, HEADER_TEMPERATURE), None);
    assert_eq!(header(headers, HEADER_HUMIDITY), None);
    assert_eq!(report.errors().as_slice(), &[Error::SensorReadInvalid]);
}

#[test]
fn negative_temperature_header_keeps_sign() {
    let config = test_config();
    let mut mb = MockBoard::new();
    mb.climate.reading = ClimateReading::new(-3.0, 81.5);

    CaptureSequencer::new(&config).run(&mut mb.board());

    let headers = &mb.http.requests()[0].headers;
    assert_eq!(header(headers, HEADER_TEMPERATURE), Some("-3.0"));
    assert_eq!(header(headers, HEADER_HUMIDITY), Some("81.5"));
}

// ── Camera failures ───────────────────────────────────────────

#[test]
fn camera_init_failure_abandons_attempt() {
    let config = test_config();
    let mut mb = MockBoard::new();
    mb.camera.init_error = Some(CameraError::InitFailed(-1));

    let report = CaptureSequencer::new(&config).run(&mut mb.board());

    assert_eq!(
        report.outcome,
        PhotoOutcome::CameraInitFailed(CameraError::InitFailed(-1))
    );
    assert_eq!(mb.camera.calls, vec![CameraCall::Init]);
    assert!(mb.flash.intensities.is_empty());
    assert_eq!(mb.climate.reads, 0);
    assert_eq!(mb.radio.polls(), 0);
    assert!(mb.http.requests().is_empty());
    assert_eq!(
        report.errors().as_slice(),
        &[Error::CameraInitFailure(CameraError::InitFailed(-1))]
    );
}

#[test]
fn capture_failure_skips_network_but_reads_sensor() {
    let config = test_config();
    let mut mb = MockBoard::new();
    mb.camera.fail_capture = true;

    let report = CaptureSequencer::new(&config).run(&mut mb.board());

    assert_eq!(report.outcome, PhotoOutcome::CaptureFailed);
    assert_eq!(report.frame_len, None);
    assert_eq!(report.radio_attempts, None);
    assert_eq!(mb.climate.reads, 1);
    assert!(report.climate.is_valid());
    assert_eq!(mb.flash.last_intensity(), Some(0));
    assert_eq!(mb.radio.polls(), 0);
    assert!(mb.http.requests().is_empty());
    assert_eq!(mb.camera.count(CameraCall::Deinit), 1);
}

// ── Radio ─────────────────────────────────────────────────────

#[test]
fn radio_timeout_waits_exactly_max_polls() {
    let config = test_config();
    let mut mb = MockBoard::new().with_radio(None);

    let report = CaptureSequencer::new(&config).run(&mut mb.board());

    assert_eq!(report.outcome, PhotoOutcome::RadioTimeout { attempts: 20 });
    assert_eq!(report.radio_attempts, Some(20));
    assert!(mb.http.requests().is_empty());
    // Sensor settle + flash settle + 20 × 500 ms of polling.
    let timing = config.timing;
    assert_eq!(
        mb.delay.total_ms(),
        u64::from(timing.sensor_settle_ms) + u64::from(timing.flash_settle_ms) + timing.radio_timeout_ms()
    );
    assert_eq!(timing.radio_timeout_ms(), 10_000);
    assert_eq!(mb.camera.count(CameraCall::Release), 1);
}

#[test]
fn invalid_credentials_never_poll() {
    let mut config = test_config();
    config.network.ssid.clear();
    let mut mb = MockBoard::new();

    let report = CaptureSequencer::new(&config).run(&mut mb.board());

    assert_eq!(report.outcome, PhotoOutcome::RadioTimeout { attempts: 0 });
    assert_eq!(mb.radio.polls(), 0);
    assert!(mb.http.requests().is_empty());
}

// ── Upload ────────────────────────────────────────────────────

#[test]
fn unexpected_status_is_rejection() {
    let config = test_config();
    let mut mb = MockBoard::new().with_reply(Ok(HttpResponse::new(500, "boom")));

    let report = CaptureSequencer::new(&config).run(&mut mb.board());

    assert_eq!(report.outcome, PhotoOutcome::UploadRejected(500));
    assert_eq!(report.errors().as_slice(), &[Error::UploadRejected(500)]);
    assert_eq!(mb.camera.count(CameraCall::Deinit), 1);
}

#[test]
fn transport_failure_is_reported() {
    let config = test_config();
    let mut mb = MockBoard::new().with_reply(Err(UploadError::Transport));

    let report = CaptureSequencer::new(&config).run(&mut mb.board());

    assert_eq!(report.outcome, PhotoOutcome::UploadTransportFailed);
    assert_eq!(report.errors().as_slice(), &[Error::UploadTransportFailure]);
}

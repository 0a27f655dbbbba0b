//! Mock board for integration tests.
//!
//! Records every flash, camera and delay call so tests can assert on the
//! full history of a wake without touching real GPIO/PWM registers.  The
//! radio, HTTP client, PSRAM detection and power manager use the crate's own
//! host simulations.

use camkeeper::adapters::http::HttpUploader;
use camkeeper::adapters::wifi::WifiAdapter;
use camkeeper::app::events::WakeEvent;
use camkeeper::app::ports::{Board, CameraPort, ClimateSensorPort, EventSink, FlashPort, HttpResponse};
use camkeeper::config::{CameraTuning, DeviceConfig, NetworkConfig};
use camkeeper::drivers::camera::{CameraProfile, Frame, MemoryClass, PsramDetector};
use camkeeper::error::{CameraError, FlashError, UploadError};
use camkeeper::power::{PowerManager, WakeReason};
use camkeeper::sensors::ClimateReading;
use embedded_hal::delay::DelayNs;

pub const UPLOAD_URL: &str = "http://192.168.1.10:5000/api/camera";

/// Default config with usable credentials.
pub fn test_config() -> DeviceConfig {
    DeviceConfig {
        network: NetworkConfig {
            ssid: "HomeWiFi".to_owned(),
            password: "mysecret8".to_owned(),
            upload_url: UPLOAD_URL.to_owned(),
        },
        ..DeviceConfig::default()
    }
}

// ── Flash ─────────────────────────────────────────────────────

pub struct MockFlash {
    pub fail_configure: bool,
    pub configure_calls: u32,
    /// Every duty written, in order.
    pub intensities: Vec<u8>,
}

#[allow(dead_code)]
impl MockFlash {
    pub fn new() -> Self {
        Self {
            fail_configure: false,
            configure_calls: 0,
            intensities: Vec::new(),
        }
    }

    pub fn last_intensity(&self) -> Option<u8> {
        self.intensities.last().copied()
    }
}

impl FlashPort for MockFlash {
    fn configure(&mut self) -> Result<(), FlashError> {
        self.configure_calls += 1;
        if self.fail_configure {
            return Err(FlashError::ConfigFailed(-1));
        }
        Ok(())
    }

    fn set_intensity(&mut self, level: u8) {
        self.intensities.push(level);
    }
}

// ── Climate ───────────────────────────────────────────────────

pub struct MockClimate {
    pub reading: ClimateReading,
    pub begun: bool,
    pub reads: u32,
}

impl MockClimate {
    pub fn new(reading: ClimateReading) -> Self {
        Self {
            reading,
            begun: false,
            reads: 0,
        }
    }
}

impl ClimateSensorPort for MockClimate {
    fn begin(&mut self) {
        self.begun = true;
    }

    fn read(&mut self) -> ClimateReading {
        self.reads += 1;
        self.reading
    }
}

// ── Camera ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCall {
    Init,
    Orientation { vertical_flip: bool, horizontal_mirror: bool },
    Capture,
    Release,
    Deinit,
}

pub struct MockCamera {
    pub init_error: Option<CameraError>,
    pub fail_capture: bool,
    pub jpeg: Vec<u8>,
    pub profile: Option<CameraProfile>,
    pub calls: Vec<CameraCall>,
}

#[allow(dead_code)]
impl MockCamera {
    pub fn new() -> Self {
        Self {
            init_error: None,
            fail_capture: false,
            jpeg: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9],
            profile: None,
            calls: Vec::new(),
        }
    }

    pub fn count(&self, call: CameraCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl CameraPort for MockCamera {
    fn init(&mut self, profile: &CameraProfile, _tuning: &CameraTuning) -> Result<(), CameraError> {
        self.calls.push(CameraCall::Init);
        if let Some(e) = self.init_error {
            return Err(e);
        }
        self.profile = Some(*profile);
        Ok(())
    }

    fn set_orientation(&mut self, vertical_flip: bool, horizontal_mirror: bool) -> Result<(), CameraError> {
        self.calls.push(CameraCall::Orientation {
            vertical_flip,
            horizontal_mirror,
        });
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame<'_>, CameraError> {
        self.calls.push(CameraCall::Capture);
        if self.fail_capture {
            return Err(CameraError::CaptureFailed);
        }
        let (width, height) = self
            .profile
            .map(|p| p.frame_size.dimensions())
            .unwrap_or((0, 0));
        Ok(Frame {
            data: &self.jpeg,
            width,
            height,
        })
    }

    fn release_frame(&mut self) {
        self.calls.push(CameraCall::Release);
    }

    fn deinit(&mut self) {
        self.calls.push(CameraCall::Deinit);
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Sums every requested delay instead of sleeping.
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl MockDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns += u64::from(ms) * 1_000_000;
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<WakeEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &WakeEvent) {
        self.events.push(event.clone());
    }
}

// ── Board ─────────────────────────────────────────────────────

pub struct MockBoard {
    pub flash: MockFlash,
    pub climate: MockClimate,
    pub camera: MockCamera,
    pub memory: PsramDetector,
    pub radio: WifiAdapter,
    pub http: HttpUploader,
    pub power: PowerManager,
    pub delay: MockDelay,
}

#[allow(dead_code)]
impl MockBoard {
    /// A healthy PSRAM board: sensor valid, radio associates on the third
    /// poll, server answers 200.
    pub fn new() -> Self {
        Self {
            flash: MockFlash::new(),
            climate: MockClimate::new(ClimateReading::new(23.44, 55.0)),
            camera: MockCamera::new(),
            memory: PsramDetector::new_simulated(MemoryClass::Extended),
            radio: WifiAdapter::new_simulated(Some(2)),
            http: HttpUploader::new_simulated(Ok(HttpResponse::new(200, "{\"status\":\"ok\"}"))),
            power: PowerManager::new_simulated(WakeReason::Timer),
            delay: MockDelay::default(),
        }
    }

    pub fn with_radio(mut self, connect_after_polls: Option<u32>) -> Self {
        self.radio = WifiAdapter::new_simulated(connect_after_polls);
        self
    }

    pub fn with_reply(mut self, reply: Result<HttpResponse, UploadError>) -> Self {
        self.http = HttpUploader::new_simulated(reply);
        self
    }

    pub fn with_memory(mut self, memory: MemoryClass) -> Self {
        self.memory = PsramDetector::new_simulated(memory);
        self
    }

    pub fn with_wake_reason(mut self, reason: WakeReason) -> Self {
        self.power = PowerManager::new_simulated(reason);
        self
    }

    pub fn board(&mut self) -> Board<'_> {
        Board {
            flash: &mut self.flash,
            climate: &mut self.climate,
            camera: &mut self.camera,
            memory: &self.memory,
            radio: &mut self.radio,
            http: &mut self.http,
            power: &mut self.power,
            delay: &mut self.delay,
        }
    }
}

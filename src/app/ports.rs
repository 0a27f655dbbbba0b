//! Port traits: the hexagonal boundary between wake logic and the board.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ WakeService / CaptureSequencer (domain)
//! ```
//!
//! Every peripheral the firmware touches during a wake sits behind one of
//! these traits.  The domain borrows them through [`Board`], a bundle of
//! `&mut dyn` handles, so tests can swap in recording mocks and the real
//! ESP-IDF adapters never leak into the wake logic.
//!
//! Blocking delays go through [`embedded_hal::delay::DelayNs`] rather than
//! a bespoke port.

use embedded_hal::delay::DelayNs;

use crate::config::CameraTuning;
use crate::cycle::PersistentState;
use crate::drivers::camera::{CameraProfile, Frame, MemoryClass};
use crate::error::{CameraError, FlashError, RadioError, UploadError};
use crate::power::WakeReason;
use crate::sensors::ClimateReading;

// ───────────────────────────────────────────────────────────────
// Flash / LED
// ───────────────────────────────────────────────────────────────

/// PWM-driven flash LED.
pub trait FlashPort {
    /// Attach the LED pin to its PWM channel and switch it off.
    /// Must be safe to call on every wake, including when already attached.
    fn configure(&mut self) -> Result<(), FlashError>;

    /// Set the duty (0 = off, 255 = full).
    fn set_intensity(&mut self, level: u8);
}

// ───────────────────────────────────────────────────────────────
// Temperature / humidity
// ───────────────────────────────────────────────────────────────

pub trait ClimateSensorPort {
    fn begin(&mut self);

    /// A failed bus transaction yields [`ClimateReading::INVALID`], never a panic.
    fn read(&mut self) -> ClimateReading;
}

// ───────────────────────────────────────────────────────────────
// Camera
// ───────────────────────────────────────────────────────────────

pub trait CameraPort {
    fn init(&mut self, profile: &CameraProfile, tuning: &CameraTuning) -> Result<(), CameraError>;

    /// Apply sensor flips.  `Err(SensorUnavailable)` is a warning, not an abort.
    fn set_orientation(&mut self, vertical_flip: bool, horizontal_mirror: bool) -> Result<(), CameraError>;

    /// Grab one frame.  The bytes stay owned by the driver until
    /// [`release_frame`](Self::release_frame).
    fn capture(&mut self) -> Result<Frame<'_>, CameraError>;

    /// Hand the frame buffer back to the driver.  No-op without a frame.
    fn release_frame(&mut self);

    /// Free the driver and its buffers.  No-op when not initialised.
    fn deinit(&mut self);
}

/// Reports whether external PSRAM is available.
pub trait MemorySource {
    fn memory_class(&self) -> MemoryClass;
}

// ───────────────────────────────────────────────────────────────
// Network radio
// ───────────────────────────────────────────────────────────────

pub trait RadioPort {
    /// Start the station and kick off association.  Returns immediately;
    /// the caller polls [`is_connected`](Self::is_connected).
    fn begin_connect(&mut self, ssid: &str, password: &str) -> Result<(), RadioError>;

    fn is_connected(&self) -> bool;

    /// Drop the association, if any.
    fn disconnect(&mut self);

    /// Bring the radio up in station mode without associating.
    fn power_on(&mut self);

    /// Stop the radio entirely.
    fn power_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// HTTP upload
// ───────────────────────────────────────────────────────────────

/// A complete HTTP response.  Body is truncated to the buffer capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: heapless::String<256>,
}

impl HttpResponse {
    pub fn new(status: u16, body: &str) -> Self {
        let mut b = heapless::String::new();
        for ch in body.chars() {
            if b.push(ch).is_err() {
                break;
            }
        }
        Self { status, body: b }
    }
}

pub trait UploadPort {
    /// POST `body` to `url`.  Any response with a status line is `Ok`;
    /// judging the status is the caller's business.
    fn post_binary(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, UploadError>;
}

// ───────────────────────────────────────────────────────────────
// Suspension
// ───────────────────────────────────────────────────────────────

pub trait SuspendPort {
    /// Why this program run started.
    fn wake_reason(&self) -> WakeReason;

    /// Flush pending log output.
    fn flush_log(&mut self);

    /// Arm the wake timer and enter deep sleep.  On hardware this never
    /// returns; simulations record the duration and return.
    fn sleep_for(&mut self, duration_secs: u64);
}

// ───────────────────────────────────────────────────────────────
// Retained state
// ───────────────────────────────────────────────────────────────

/// Storage for [`PersistentState`] that survives deep sleep but not
/// power loss.
pub trait RetainedStore {
    /// `None` when nothing valid is retained (power-on, garbage, first flash).
    fn load(&self) -> Option<PersistentState>;

    fn store(&mut self, state: &PersistentState);
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`WakeEvent`](super::events::WakeEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::WakeEvent);
}

// ───────────────────────────────────────────────────────────────
// Board bundle
// ───────────────────────────────────────────────────────────────

/// Borrowed handles to every peripheral a wake may touch.
///
/// Separate fields (rather than one object implementing every port) let
/// the sequencer hold the camera's frame borrow while driving the radio
/// and HTTP client.
pub struct Board<'a> {
    pub flash: &'a mut dyn FlashPort,
    pub climate: &'a mut dyn ClimateSensorPort,
    pub camera: &'a mut dyn CameraPort,
    pub memory: &'a dyn MemorySource,
    pub radio: &'a mut dyn RadioPort,
    pub http: &'a mut dyn UploadPort,
    pub power: &'a mut dyn SuspendPort,
    pub delay: &'a mut dyn DelayNs,
}

//! Capture-and-upload sequence for photo wakes.
//!
//! ```text
//!  flash+climate ─▶ profile ─▶ camera init ─▶ orientation ─▶ flash/capture
//!        ─▶ climate read ─▶ radio connect ─▶ POST ─▶ release + deinit
//! ```
//!
//! Each step may fail; none of them panic or escape.  The first hard
//! failure decides the [`PhotoOutcome`], later steps that no longer make
//! sense are skipped, and the camera is always released before returning.
//! Resetting the photo counter is the caller's job, so a sequence that
//! bails out early still counts as an attempt.

use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::ports::{Board, RadioPort, UploadPort};
use crate::config::{DeviceConfig, NetworkConfig, TimingConfig};
use crate::drivers::camera::CameraProfile;
use crate::error::{CameraError, Error, RadioError, UploadError};
use crate::sensors::ClimateReading;

pub const CONTENT_TYPE_JPEG: &str = "image/jpeg";
pub const HEADER_TEMPERATURE: &str = "X-Temperature";
pub const HEADER_HUMIDITY: &str = "X-Humidity";

/// How a photo attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoOutcome {
    /// The server answered with the expected status.
    Uploaded { status: u16 },
    CameraInitFailed(CameraError),
    CaptureFailed,
    RadioTimeout { attempts: u32 },
    UploadRejected(u16),
    UploadTransportFailed,
}

impl PhotoOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }

    /// The failure as a wake [`Error`], if any.
    pub fn error(&self) -> Option<Error> {
        match *self {
            Self::Uploaded { .. } => None,
            Self::CameraInitFailed(e) => Some(Error::CameraInitFailure(e)),
            Self::CaptureFailed => Some(Error::CameraCaptureFailure),
            Self::RadioTimeout { .. } => Some(Error::RadioConnectTimeout),
            Self::UploadRejected(status) => Some(Error::UploadRejected(status)),
            Self::UploadTransportFailed => Some(Error::UploadTransportFailure),
        }
    }
}

/// Everything worth knowing about one photo attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoReport {
    pub outcome: PhotoOutcome,
    pub profile: CameraProfile,
    /// `INVALID` when the sensor failed or was never read.
    pub climate: ClimateReading,
    /// JPEG size in bytes, when a frame was captured.
    pub frame_len: Option<usize>,
    /// Polls spent waiting for the radio, when a connect was attempted.
    pub radio_attempts: Option<u32>,
}

impl PhotoReport {
    /// All errors of the attempt, the outcome first.
    pub fn errors(&self) -> heapless::Vec<Error, 2> {
        let mut errors = heapless::Vec::new();
        if let Some(e) = self.outcome.error() {
            let _ = errors.push(e);
        }
        if !self.climate.is_valid() && !matches!(self.outcome, PhotoOutcome::CameraInitFailed(_)) {
            let _ = errors.push(Error::SensorReadInvalid);
        }
        errors
    }
}

/// Header values for a reading; an invalid half is `None` and its header
/// is left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClimateHeaders {
    pub temperature: Option<heapless::String<16>>,
    pub humidity: Option<heapless::String<16>>,
}

impl ClimateHeaders {
    pub fn from_reading(reading: &ClimateReading) -> Self {
        Self {
            temperature: reading.temperature_c.and_then(one_decimal),
            humidity: reading.humidity_pct.and_then(one_decimal),
        }
    }
}

fn one_decimal(value: f32) -> Option<heapless::String<16>> {
    let mut s = heapless::String::new();
    write!(s, "{:.1}", value).ok()?;
    Some(s)
}

/// Drives one photo attempt against a [`Board`].
pub struct CaptureSequencer<'c> {
    config: &'c DeviceConfig,
}

impl<'c> CaptureSequencer<'c> {
    pub fn new(config: &'c DeviceConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, board: &mut Board<'_>) -> PhotoReport {
        let timing = &self.config.timing;
        let has_flash = self.config.capabilities.has_flash_led;

        // 1. Flash and climate sensor.
        if has_flash {
            if let Err(e) = board.flash.configure() {
                warn!("seq: flash configure failed ({}), continuing without", e);
            }
        }
        board.climate.begin();
        board.delay.delay_ms(timing.sensor_settle_ms);

        // 2. Profile by memory class.
        let memory = board.memory.memory_class();
        let profile = CameraProfile::for_memory(memory);
        info!("seq: memory {:?} → {:?}", memory, profile);

        let mut report = PhotoReport {
            outcome: PhotoOutcome::CaptureFailed,
            profile,
            climate: ClimateReading::INVALID,
            frame_len: None,
            radio_attempts: None,
        };

        // 3. Camera init; failure ends the attempt here.
        if let Err(e) = board.camera.init(&profile, &self.config.camera) {
            warn!("seq: camera init failed ({}), abandoning photo", e);
            report.outcome = PhotoOutcome::CameraInitFailed(e);
            return report;
        }

        // 4. Orientation, best effort.
        let tuning = &self.config.camera;
        if let Err(e) = board
            .camera
            .set_orientation(tuning.vertical_flip, tuning.horizontal_mirror)
        {
            warn!("seq: orientation not applied ({})", e);
        }

        // 5. Flash, settle, capture, flash off whatever happened.
        if has_flash {
            board.flash.set_intensity(timing.photo_flash_duty);
        }
        board.delay.delay_ms(timing.flash_settle_ms);
        let frame = match board.camera.capture() {
            Ok(frame) => {
                info!(
                    "seq: captured {} bytes ({}x{})",
                    frame.len(),
                    frame.width,
                    frame.height
                );
                Some(frame)
            }
            Err(e) => {
                warn!("seq: capture failed ({})", e);
                None
            }
        };
        if has_flash {
            board.flash.set_intensity(0);
        }

        // 6. Climate, regardless of the capture.
        report.climate = board.climate.read();
        if !report.climate.is_valid() {
            warn!("seq: {}", Error::SensorReadInvalid);
        }

        // 7./8. Network and upload, only with something to send.
        if let Some(frame) = frame {
            report.frame_len = Some(frame.len());
            report.outcome = match connect_radio(board.radio, board.delay, &self.config.network, timing) {
                Ok(attempts) => {
                    report.radio_attempts = Some(attempts);
                    upload_frame(
                        board.http,
                        &self.config.network.upload_url,
                        frame.data,
                        &report.climate,
                        timing.expected_http_status,
                    )
                }
                Err(RadioError::Timeout { attempts }) => {
                    report.radio_attempts = Some(attempts);
                    PhotoOutcome::RadioTimeout { attempts }
                }
                Err(e) => {
                    warn!("seq: radio unusable ({})", e);
                    report.radio_attempts = Some(0);
                    PhotoOutcome::RadioTimeout { attempts: 0 }
                }
            };
        }

        // 9. Hand back the frame and free the driver before sleep.
        board.camera.release_frame();
        board.camera.deinit();

        match report.outcome {
            PhotoOutcome::Uploaded { status } => info!("seq: upload ok (HTTP {})", status),
            other => warn!("seq: photo attempt failed ({:?})", other),
        }
        report
    }
}

/// Start association and poll it a bounded number of times.
///
/// Sleeps exactly `radio_max_attempts × radio_poll_interval_ms` before
/// giving up.  Returns the number of polls that were needed.
pub fn connect_radio(
    radio: &mut dyn RadioPort,
    delay: &mut dyn DelayNs,
    network: &NetworkConfig,
    timing: &TimingConfig,
) -> Result<u32, RadioError> {
    info!("radio: connecting to '{}'", network.ssid);
    radio.begin_connect(&network.ssid, &network.password)?;

    let max = timing.radio_max_attempts;
    for attempt in 1..=max {
        if radio.is_connected() {
            info!("radio: connected after {} poll(s)", attempt);
            return Ok(attempt);
        }
        delay.delay_ms(timing.radio_poll_interval_ms);
        info!("radio: waiting, attempt {}/{}", attempt, max);
    }
    if radio.is_connected() {
        info!("radio: connected after {} poll(s)", max);
        return Ok(max);
    }
    warn!("radio: {} after {} ms", Error::RadioConnectTimeout, timing.radio_timeout_ms());
    Err(RadioError::Timeout { attempts: max })
}

/// POST one JPEG with the optional climate headers.
pub fn upload_frame(
    http: &mut dyn UploadPort,
    url: &str,
    jpeg: &[u8],
    climate: &ClimateReading,
    expected_status: u16,
) -> PhotoOutcome {
    let values = ClimateHeaders::from_reading(climate);
    let mut headers: heapless::Vec<(&str, &str), 3> = heapless::Vec::new();
    let _ = headers.push(("Content-Type", CONTENT_TYPE_JPEG));
    if let Some(t) = values.temperature.as_deref() {
        let _ = headers.push((HEADER_TEMPERATURE, t));
    }
    if let Some(h) = values.humidity.as_deref() {
        let _ = headers.push((HEADER_HUMIDITY, h));
    }

    match http.post_binary(url, &headers, jpeg) {
        Ok(resp) if resp.status == expected_status => {
            info!("upload: HTTP {} | {}", resp.status, resp.body);
            PhotoOutcome::Uploaded { status: resp.status }
        }
        Ok(resp) => {
            warn!("upload: {} | {}", Error::from(UploadError::Rejected(resp.status)), resp.body);
            PhotoOutcome::UploadRejected(resp.status)
        }
        Err(e) => {
            warn!("upload: {}", Error::from(e));
            match e {
                UploadError::Rejected(status) => PhotoOutcome::UploadRejected(status),
                UploadError::Transport => PhotoOutcome::UploadTransportFailed,
            }
        }
    }
}

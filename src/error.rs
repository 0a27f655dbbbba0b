//! Error types for the camkeeper firmware.
//!
//! Every failure inside a wake is local: it is logged, recorded in the
//! wake report, and the wake carries on to the next fallback step.  The
//! unified [`Error`] enum mirrors that taxonomy so the log stream and the
//! [`PhotoReport`](crate::sequencer::PhotoReport) speak the same language.
//! All variants are `Copy`.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level wake error
// ---------------------------------------------------------------------------

/// Every recoverable failure a photo wake can run into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The humidity/temperature sensor returned the invalid sentinel.
    SensorReadInvalid,
    /// `esp_camera_init` (or the simulated equivalent) failed.
    CameraInitFailure(CameraError),
    /// A frame could not be grabbed from an initialised camera.
    CameraCaptureFailure,
    /// The station did not associate within the bounded poll loop.
    RadioConnectTimeout,
    /// The HTTP request never produced a status line.
    UploadTransportFailure,
    /// The server answered with something other than the expected status.
    UploadRejected(u16),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorReadInvalid => write!(f, "sensor reading invalid"),
            Self::CameraInitFailure(e) => write!(f, "camera init failed: {e}"),
            Self::CameraCaptureFailure => write!(f, "camera capture failed"),
            Self::RadioConnectTimeout => write!(f, "WiFi connect timed out"),
            Self::UploadTransportFailure => write!(f, "upload transport failed"),
            Self::UploadRejected(status) => write!(f, "upload rejected with HTTP {status}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Camera errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraError {
    /// Driver init returned a non-OK `esp_err_t`.
    InitFailed(i32),
    /// Frame buffer get returned null.
    CaptureFailed,
    /// The sensor handle could not be obtained (orientation not applied).
    SensorUnavailable,
    /// An operation needed an initialised camera.
    NotInitialised,
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitFailed(code) => write!(f, "esp_camera_init error 0x{code:x}"),
            Self::CaptureFailed => write!(f, "no frame buffer returned"),
            Self::SensorUnavailable => write!(f, "camera sensor handle unavailable"),
            Self::NotInitialised => write!(f, "camera not initialised"),
        }
    }
}

impl From<CameraError> for Error {
    fn from(e: CameraError) -> Self {
        match e {
            CameraError::CaptureFailed => Self::CameraCaptureFailure,
            other => Self::CameraInitFailure(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Radio errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// Gave up after `attempts` polls without an association.
    Timeout { attempts: u32 },
    /// The WiFi driver refused to start or begin connecting.
    StartFailed,
    /// SSID or password do not fit the driver's fixed-size fields.
    InvalidCredentials,
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { attempts } => write!(f, "not connected after {attempts} polls"),
            Self::StartFailed => write!(f, "WiFi driver start failed"),
            Self::InvalidCredentials => write!(f, "invalid SSID/password"),
        }
    }
}

impl From<RadioError> for Error {
    fn from(_: RadioError) -> Self {
        Self::RadioConnectTimeout
    }
}

// ---------------------------------------------------------------------------
// Upload errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    /// Connection, TLS, write or read failure below HTTP.
    Transport,
    /// A complete response arrived with an unexpected status code.
    Rejected(u16),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "HTTP transport error"),
            Self::Rejected(status) => write!(f, "HTTP status {status}"),
        }
    }
}

impl From<UploadError> for Error {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Transport => Self::UploadTransportFailure,
            UploadError::Rejected(status) => Self::UploadRejected(status),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor never pulled the bus low / high in time.
    Timeout,
    /// The 40-bit frame failed its checksum.
    Checksum,
    /// GPIO access failed or no sensor answered.
    Gpio,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "bus timeout"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::Gpio => write!(f, "GPIO access failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(_: SensorError) -> Self {
        Self::SensorReadInvalid
    }
}

// ---------------------------------------------------------------------------
// Flash LED errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// LEDC timer or channel configuration returned an error code.
    ConfigFailed(i32),
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigFailed(rc) => write!(f, "LEDC config failed (rc={rc})"),
        }
    }
}

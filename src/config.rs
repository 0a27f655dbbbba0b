//! Device configuration
//!
//! All tunable parameters for the camkeeper firmware.  Intervals and
//! timings are compile-time defaults taken from field use with a USB
//! powerbank; credentials and the upload URL are baked in by `build.rs`
//! (from `.env` or the build environment) and fall back to placeholders
//! that simply fail at runtime.

use serde::{Deserialize, Serialize};

/// Upper bound most powerbanks tolerate before cutting a near-zero load.
/// Not enforced, only warned about.
pub const POWERBANK_AUTO_OFF_SECS: u32 = 120;

const PLACEHOLDER_SSID: &str = "WIFI_SSID_PLACEHOLDER";
const PLACEHOLDER_PASSWORD: &str = "WIFI_PASSWORD_PLACEHOLDER";
const PLACEHOLDER_URL: &str = "http://SERVER_IP_PLACEHOLDER:5000/api/camera";

/// Wake cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalConfig {
    /// Target spacing between photo wakes (seconds).
    pub photo_interval_secs: u32,
    /// Deep-sleep duration between every wake (seconds).
    /// Must stay below the powerbank's auto-off threshold.
    pub keep_alive_interval_secs: u32,
}

impl IntervalConfig {
    pub const fn new(photo_interval_secs: u32, keep_alive_interval_secs: u32) -> Self {
        Self {
            photo_interval_secs,
            keep_alive_interval_secs,
        }
    }

    /// Number of keep-alive wakes that add up to at least one photo interval.
    pub fn wakes_needed_for_photo(&self) -> u32 {
        crate::policy::wakes_needed_for_photo(self.photo_interval_secs, self.keep_alive_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keep_alive_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "keep_alive_interval_secs must be > 0",
            ));
        }
        if self.photo_interval_secs < self.keep_alive_interval_secs {
            return Err(ConfigError::ValidationFailed(
                "photo_interval_secs must be >= keep_alive_interval_secs",
            ));
        }
        Ok(())
    }

    /// True when the keep-alive cadence is too slow to hold a powerbank on.
    pub fn exceeds_powerbank_limit(&self) -> bool {
        self.keep_alive_interval_secs > POWERBANK_AUTO_OFF_SECS
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self::new(3600, 90)
    }
}

/// Station credentials and upload target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub ssid: String,
    pub password: String,
    pub upload_url: String,
}

impl NetworkConfig {
    /// Values baked in at build time, or placeholders.
    pub fn from_build_env() -> Self {
        Self {
            ssid: option_env!("WIFI_SSID").unwrap_or(PLACEHOLDER_SSID).to_string(),
            password: option_env!("WIFI_PASSWORD")
                .unwrap_or(PLACEHOLDER_PASSWORD)
                .to_string(),
            upload_url: option_env!("SERVER_URL").unwrap_or(PLACEHOLDER_URL).to_string(),
        }
    }

    /// True if any field is still the compiled-in placeholder.
    pub fn uses_placeholders(&self) -> bool {
        self.ssid == PLACEHOLDER_SSID
            || self.password == PLACEHOLDER_PASSWORD
            || self.upload_url == PLACEHOLDER_URL
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::from_build_env()
    }
}

/// Fixed delays, duties and retry bounds used inside a wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Flash duty during a photo (0-255).
    pub photo_flash_duty: u8,
    /// Exposure settle time with the flash on before grabbing (ms).
    pub flash_settle_ms: u32,
    /// Settle time after starting the humidity sensor (ms).
    pub sensor_settle_ms: u32,
    /// Flash duty for the keep-alive pulse (0-255).
    pub keep_alive_flash_duty: u8,
    /// How long the keep-alive flash pulse is held (ms).
    pub keep_alive_flash_ms: u32,
    /// How long the radio stays on for the LED-less keep-alive pulse (ms).
    pub keep_alive_radio_ms: u32,
    /// Pause after any keep-alive action (ms).
    pub keep_alive_pause_ms: u32,
    /// WiFi association poll interval (ms).
    pub radio_poll_interval_ms: u32,
    /// Number of polls before the association is declared timed out.
    pub radio_max_attempts: u32,
    /// The only status code that counts as a successful upload.
    pub expected_http_status: u16,
    /// Pause after flushing the log, before deep sleep (ms).
    pub log_flush_ms: u32,
}

impl TimingConfig {
    /// Total time the association loop may wait (ms).
    pub fn radio_timeout_ms(&self) -> u64 {
        self.radio_poll_interval_ms as u64 * self.radio_max_attempts as u64
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            photo_flash_duty: 200,
            flash_settle_ms: 1000,
            sensor_settle_ms: 100,
            keep_alive_flash_duty: 255,
            keep_alive_flash_ms: 500,
            keep_alive_radio_ms: 200,
            keep_alive_pause_ms: 100,
            radio_poll_interval_ms: 500,
            radio_max_attempts: 20, // ~10 s
            expected_http_status: 200,
            log_flush_ms: 100,
        }
    }
}

/// Camera tuning that does not depend on the memory class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraTuning {
    pub xclk_freq_hz: u32,
    pub vertical_flip: bool,
    pub horizontal_mirror: bool,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            xclk_freq_hz: 20_000_000,
            vertical_flip: true,
            horizontal_mirror: true,
        }
    }
}

/// Optional hardware present on this board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// A flash LED is wired to a PWM-capable pin.  Without it the
    /// keep-alive load comes from pulsing the radio instead.
    pub has_flash_led: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self { has_flash_led: true }
    }
}

/// Everything a wake needs to know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub intervals: IntervalConfig,
    pub network: NetworkConfig,
    pub timing: TimingConfig,
    pub camera: CameraTuning,
    pub capabilities: Capabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

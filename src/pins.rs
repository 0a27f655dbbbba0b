//! GPIO / peripheral pin assignments for the AI-Thinker ESP32-CAM module.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  `-1` means "not connected" to the camera driver.

// ---------------------------------------------------------------------------
// OV2640 camera (DVP parallel bus + SCCB)
// ---------------------------------------------------------------------------

/// Camera power-down, active high.
pub const CAM_PWDN_GPIO: i32 = 32;
/// Hardware reset line is not routed on this module.
pub const CAM_RESET_GPIO: i32 = -1;
/// Master clock output to the sensor.
pub const CAM_XCLK_GPIO: i32 = 0;
/// SCCB (I²C-like) data.
pub const CAM_SIOD_GPIO: i32 = 26;
/// SCCB clock.
pub const CAM_SIOC_GPIO: i32 = 27;

/// Parallel data lines, most significant first (Y9 → D7 … Y2 → D0).
pub const CAM_Y9_GPIO: i32 = 35;
pub const CAM_Y8_GPIO: i32 = 34;
pub const CAM_Y7_GPIO: i32 = 39;
pub const CAM_Y6_GPIO: i32 = 36;
pub const CAM_Y5_GPIO: i32 = 21;
pub const CAM_Y4_GPIO: i32 = 19;
pub const CAM_Y3_GPIO: i32 = 18;
pub const CAM_Y2_GPIO: i32 = 5;

pub const CAM_VSYNC_GPIO: i32 = 25;
pub const CAM_HREF_GPIO: i32 = 23;
pub const CAM_PCLK_GPIO: i32 = 22;

// ---------------------------------------------------------------------------
// Flash LED (high-power white LED through a transistor)
// ---------------------------------------------------------------------------

/// Also an RTC GPIO; deep sleep may leave a hold latched on it.
pub const FLASH_LED_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC frequency for the flash LED.
pub const FLASH_PWM_FREQ_HZ: u32 = 5_000;

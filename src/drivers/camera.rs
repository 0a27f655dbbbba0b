//! OV2640 camera driver over the `esp32-camera` component.
//!
//! The driver is brought up fresh on every photo wake and torn down
//! before sleep.  Resolution, JPEG quality and frame-buffer placement
//! depend on whether the module has external PSRAM; [`CameraProfile`]
//! captures that choice as plain data so it can be tested on the host.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: raw `esp_camera_*` calls through the generated
//! `esp_idf_svc::sys::camera` bindings.
//! On host/test: serves a canned JPEG from memory.

use log::{info, warn};

use crate::app::ports::{CameraPort, MemorySource};
use crate::config::CameraTuning;
use crate::error::CameraError;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Profile ───────────────────────────────────────────────────

/// Whether the module carries external PSRAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryClass {
    /// PSRAM detected.
    Extended,
    /// Internal DRAM only.
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSize {
    /// 800 × 600.
    Svga,
    /// 640 × 480.
    Vga,
}

impl FrameSize {
    pub fn dimensions(self) -> (u16, u16) {
        match self {
            Self::Svga => (800, 600),
            Self::Vga => (640, 480),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabMode {
    /// Always hand out the newest frame, dropping stale ones.
    Latest,
    /// Fill a buffer only when one is free.
    WhenEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FbLocation {
    Psram,
    Dram,
}

/// Everything about the camera setup that depends on available memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraProfile {
    pub frame_size: FrameSize,
    /// 0 – 63, lower is better.
    pub jpeg_quality: u8,
    pub fb_count: u8,
    pub grab_mode: GrabMode,
    pub fb_location: FbLocation,
}

impl CameraProfile {
    pub const fn for_memory(memory: MemoryClass) -> Self {
        match memory {
            MemoryClass::Extended => Self {
                frame_size: FrameSize::Svga,
                jpeg_quality: 10,
                fb_count: 2,
                grab_mode: GrabMode::Latest,
                fb_location: FbLocation::Psram,
            },
            MemoryClass::Internal => Self {
                frame_size: FrameSize::Vga,
                jpeg_quality: 12,
                fb_count: 1,
                grab_mode: GrabMode::WhenEmpty,
                fb_location: FbLocation::Dram,
            },
        }
    }
}

/// A captured JPEG, borrowed from the driver's frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub data: &'a [u8],
    pub width: u16,
    pub height: u16,
}

impl Frame<'_> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// ── PSRAM detection ───────────────────────────────────────────────

pub struct PsramDetector {
    #[cfg(not(target_os = "espidf"))]
    simulated: MemoryClass,
}

impl PsramDetector {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new_simulated(memory: MemoryClass) -> Self {
        Self { simulated: memory }
    }
}

impl MemorySource for PsramDetector {
    #[cfg(target_os = "espidf")]
    fn memory_class(&self) -> MemoryClass {
        use esp_idf_svc::sys::{heap_caps_get_total_size, MALLOC_CAP_SPIRAM};
        // SAFETY: read-only heap statistics query.
        let psram = unsafe { heap_caps_get_total_size(MALLOC_CAP_SPIRAM) };
        if psram > 0 {
            MemoryClass::Extended
        } else {
            MemoryClass::Internal
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn memory_class(&self) -> MemoryClass {
        self.simulated
    }
}

// ── ESP-IDF driver ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::camera::*;

#[cfg(target_os = "espidf")]
pub struct CameraDriver {
    initialised: bool,
    fb: *mut camera_fb_t,
}

#[cfg(target_os = "espidf")]
impl CameraDriver {
    pub fn new() -> Self {
        Self {
            initialised: false,
            fb: core::ptr::null_mut(),
        }
    }

    fn build_config(profile: &CameraProfile, tuning: &CameraTuning) -> camera_config_t {
        let mut config = camera_config_t::default();

        config.pin_pwdn = pins::CAM_PWDN_GPIO;
        config.pin_reset = pins::CAM_RESET_GPIO;
        config.pin_xclk = pins::CAM_XCLK_GPIO;
        config.pin_d7 = pins::CAM_Y9_GPIO;
        config.pin_d6 = pins::CAM_Y8_GPIO;
        config.pin_d5 = pins::CAM_Y7_GPIO;
        config.pin_d4 = pins::CAM_Y6_GPIO;
        config.pin_d3 = pins::CAM_Y5_GPIO;
        config.pin_d2 = pins::CAM_Y4_GPIO;
        config.pin_d1 = pins::CAM_Y3_GPIO;
        config.pin_d0 = pins::CAM_Y2_GPIO;
        config.pin_vsync = pins::CAM_VSYNC_GPIO;
        config.pin_href = pins::CAM_HREF_GPIO;
        config.pin_pclk = pins::CAM_PCLK_GPIO;
        config.__bindgen_anon_1.pin_sccb_sda = pins::CAM_SIOD_GPIO;
        config.__bindgen_anon_2.pin_sccb_scl = pins::CAM_SIOC_GPIO;

        config.xclk_freq_hz = tuning.xclk_freq_hz as i32;
        config.ledc_timer = ledc_timer_t_LEDC_TIMER_0;
        config.ledc_channel = ledc_channel_t_LEDC_CHANNEL_0;
        config.pixel_format = pixformat_t_PIXFORMAT_JPEG;

        config.frame_size = match profile.frame_size {
            FrameSize::Svga => framesize_t_FRAMESIZE_SVGA,
            FrameSize::Vga => framesize_t_FRAMESIZE_VGA,
        };
        config.jpeg_quality = profile.jpeg_quality as i32;
        config.fb_count = profile.fb_count as usize;
        config.grab_mode = match profile.grab_mode {
            GrabMode::Latest => camera_grab_mode_t_CAMERA_GRAB_LATEST,
            GrabMode::WhenEmpty => camera_grab_mode_t_CAMERA_GRAB_WHEN_EMPTY,
        };
        config.fb_location = match profile.fb_location {
            FbLocation::Psram => camera_fb_location_t_CAMERA_FB_IN_PSRAM,
            FbLocation::Dram => camera_fb_location_t_CAMERA_FB_IN_DRAM,
        };
        config
    }
}

#[cfg(target_os = "espidf")]
impl CameraPort for CameraDriver {
    fn init(&mut self, profile: &CameraProfile, tuning: &CameraTuning) -> Result<(), CameraError> {
        let config = Self::build_config(profile, tuning);
        // SAFETY: config outlives the call; the driver copies what it needs.
        let err = unsafe { esp_camera_init(&config) };
        if err != ESP_OK as i32 {
            warn!("camera: init failed (0x{:x})", err);
            return Err(CameraError::InitFailed(err));
        }
        self.initialised = true;
        info!(
            "camera: ready ({:?}, q={}, fb={} in {:?})",
            profile.frame_size, profile.jpeg_quality, profile.fb_count, profile.fb_location
        );
        Ok(())
    }

    fn set_orientation(&mut self, vertical_flip: bool, horizontal_mirror: bool) -> Result<(), CameraError> {
        if !self.initialised {
            return Err(CameraError::NotInitialised);
        }
        // SAFETY: the sensor handle is valid while the driver is initialised.
        unsafe {
            let sensor = esp_camera_sensor_get();
            if sensor.is_null() {
                return Err(CameraError::SensorUnavailable);
            }
            if let Some(set_vflip) = (*sensor).set_vflip {
                set_vflip(sensor, i32::from(vertical_flip));
            }
            if let Some(set_hmirror) = (*sensor).set_hmirror {
                set_hmirror(sensor, i32::from(horizontal_mirror));
            }
        }
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame<'_>, CameraError> {
        if !self.initialised {
            return Err(CameraError::NotInitialised);
        }
        self.release_frame();
        // SAFETY: the driver is initialised; a non-null buffer stays valid
        // until it is handed back with esp_camera_fb_return.
        unsafe {
            let fb = esp_camera_fb_get();
            if fb.is_null() {
                return Err(CameraError::CaptureFailed);
            }
            self.fb = fb;
            let data = core::slice::from_raw_parts((*fb).buf, (*fb).len);
            Ok(Frame {
                data,
                width: (*fb).width as u16,
                height: (*fb).height as u16,
            })
        }
    }

    fn release_frame(&mut self) {
        if !self.fb.is_null() {
            // SAFETY: fb came from esp_camera_fb_get and is returned once.
            unsafe { esp_camera_fb_return(self.fb) };
            self.fb = core::ptr::null_mut();
        }
    }

    fn deinit(&mut self) {
        self.release_frame();
        if self.initialised {
            // SAFETY: no frame buffers are outstanding.
            let err = unsafe { esp_camera_deinit() };
            if err != ESP_OK as i32 {
                warn!("camera: deinit returned 0x{:x}", err);
            }
            self.initialised = false;
        }
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct CameraDriver {
    initialised: bool,
    profile: Option<CameraProfile>,
    jpeg: Vec<u8>,
    frame_out: bool,
}

#[cfg(not(target_os = "espidf"))]
impl CameraDriver {
    /// Serve `jpeg` for every capture.
    pub fn new_simulated(jpeg: Vec<u8>) -> Self {
        Self {
            initialised: false,
            profile: None,
            jpeg,
            frame_out: false,
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn frame_outstanding(&self) -> bool {
        self.frame_out
    }
}

#[cfg(not(target_os = "espidf"))]
impl CameraPort for CameraDriver {
    fn init(&mut self, profile: &CameraProfile, tuning: &CameraTuning) -> Result<(), CameraError> {
        info!(
            "camera(sim): init {:?} q={} xclk={} Hz",
            profile.frame_size, profile.jpeg_quality, tuning.xclk_freq_hz
        );
        self.profile = Some(*profile);
        self.initialised = true;
        Ok(())
    }

    fn set_orientation(&mut self, vertical_flip: bool, horizontal_mirror: bool) -> Result<(), CameraError> {
        if !self.initialised {
            return Err(CameraError::NotInitialised);
        }
        info!("camera(sim): vflip={} hmirror={}", vertical_flip, horizontal_mirror);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame<'_>, CameraError> {
        let Some(profile) = self.profile.filter(|_| self.initialised) else {
            return Err(CameraError::NotInitialised);
        };
        if self.jpeg.is_empty() {
            warn!("camera(sim): no frame configured");
            return Err(CameraError::CaptureFailed);
        }
        self.frame_out = true;
        let (width, height) = profile.frame_size.dimensions();
        Ok(Frame {
            data: &self.jpeg,
            width,
            height,
        })
    }

    fn release_frame(&mut self) {
        self.frame_out = false;
    }

    fn deinit(&mut self) {
        self.release_frame();
        self.initialised = false;
        self.profile = None;
    }
}

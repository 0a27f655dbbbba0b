//! Raw LEDC setup for the flash LED.
//!
//! The camera driver claims LEDC timer 0 / channel 0 for its XCLK, so the
//! flash runs on its own timer and channel.  Everything here is plain
//! ESP-IDF sys calls; on the host the functions only log.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::error::FlashError;
#[cfg(target_os = "espidf")]
use crate::pins;

/// LEDC channel driving the flash LED.
pub const LEDC_CH_FLASH: u32 = 5;
/// LEDC timer for the flash channel (timer 0 belongs to the camera XCLK).
pub const LEDC_TIMER_FLASH: u32 = 2;

/// Release any RTC hold on the flash pin, then bind it to its PWM channel
/// at zero duty.  Re-running it on an already configured channel is fine:
/// LEDC simply reprograms the same registers.
#[cfg(target_os = "espidf")]
pub fn init_flash_ledc() -> Result<(), FlashError> {
    // SAFETY: called from the single wake task; no other code touches
    // this timer/channel pair.
    unsafe {
        // Deep sleep may have latched GPIO 4; an active hold blocks PWM.
        rtc_gpio_hold_dis(pins::FLASH_LED_GPIO);

        let timer = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            timer_num: LEDC_TIMER_FLASH,
            duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
            freq_hz: pins::FLASH_PWM_FREQ_HZ,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        let ret = ledc_timer_config(&timer);
        if ret != ESP_OK as i32 {
            return Err(FlashError::ConfigFailed(ret));
        }

        let ret = ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: LEDC_CH_FLASH,
            timer_sel: LEDC_TIMER_FLASH,
            gpio_num: pins::FLASH_LED_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        });
        if ret != ESP_OK as i32 {
            return Err(FlashError::ConfigFailed(ret));
        }
    }
    info!(
        "hw_init: flash LED on GPIO {} (LEDC CH{}, {} Hz, {}-bit)",
        pins::FLASH_LED_GPIO,
        LEDC_CH_FLASH,
        pins::FLASH_PWM_FREQ_HZ,
        pins::PWM_RESOLUTION_BITS
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_flash_ledc() -> Result<(), FlashError> {
    log::info!("hw_init(sim): flash LEDC setup skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u8) {
    // SAFETY: channel was configured by init_flash_ledc(); only the wake
    // task writes duty registers.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty as u32);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u8) {}

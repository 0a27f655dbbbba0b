//! Flash LED driver.
//!
//! One LEDC PWM channel drives the module's white flash LED.  It doubles
//! as the keep-alive load: a short full-power burst draws enough current
//! to reset a powerbank's idle timer.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC channel via hw_init.
//! On host/test: tracks state in-memory only.

use log::debug;

use crate::app::ports::FlashPort;
use crate::drivers::hw_init;
use crate::error::FlashError;

pub struct FlashLed {
    configured: bool,
    current: u8,
}

impl FlashLed {
    pub fn new() -> Self {
        Self {
            configured: false,
            current: 0,
        }
    }

    pub fn current_intensity(&self) -> u8 {
        self.current
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }
}

impl Default for FlashLed {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashPort for FlashLed {
    fn configure(&mut self) -> Result<(), FlashError> {
        hw_init::init_flash_ledc()?;
        self.configured = true;
        self.current = 0;
        Ok(())
    }

    fn set_intensity(&mut self, level: u8) {
        if !self.configured {
            debug!("flash: set_intensity({}) before configure, ignored", level);
            return;
        }
        hw_init::ledc_set(hw_init::LEDC_CH_FLASH, level);
        self.current = level;
    }
}

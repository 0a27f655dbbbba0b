//! Peripheral drivers and one-shot hardware setup.

pub mod camera;
pub mod flash_led;
pub mod hw_init;

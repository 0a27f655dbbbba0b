//! camkeeper firmware library.
//!
//! Keeps a USB powerbank awake with short current pulses on every wake and
//! uploads a JPEG with temperature and humidity once per photo interval.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; everything else runs on the host for testing.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod cycle;
pub mod error;
pub mod fsm;
pub mod policy;
pub mod power;
pub mod sequencer;

#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;

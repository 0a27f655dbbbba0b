//! Sensor subsystem.
//!
//! Only one sensor lives on this board: a DHT11 humidity/temperature
//! module.  Its driver reports a [`ClimateReading`], where a failed bus
//! transaction is the all-`None` [`ClimateReading::INVALID`] sentinel
//! rather than an error, so a flaky sensor never costs the photo.

pub mod dht11;

/// One temperature/humidity sample.  `None` marks an invalid value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
}

impl ClimateReading {
    /// Sentinel for a failed read.
    pub const INVALID: Self = Self {
        temperature_c: None,
        humidity_pct: None,
    };

    /// Build a reading, dropping non-finite values.
    pub fn new(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            temperature_c: temperature_c.is_finite().then_some(temperature_c),
            humidity_pct: humidity_pct.is_finite().then_some(humidity_pct),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.temperature_c.is_some() && self.humidity_pct.is_some()
    }
}

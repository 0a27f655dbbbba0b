//! DHT11 single-wire humidity/temperature sensor.
//!
//! Thin [`ClimateSensorPort`] adapter over the `dht-sensor` crate.  The
//! data pin must be an open-drain input/output (`PinDriver::input_output_od`
//! on ESP-IDF) and the delay must resolve microseconds (`Ets`).  Every
//! failure maps to [`ClimateReading::INVALID`] at the port boundary.
//!
//! Generic over the pin and delay, so the same code runs on the ESP32 and
//! against mock pins on the host.

use dht_sensor::{DhtError, dht11};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{info, warn};

use super::ClimateReading;
use crate::app::ports::ClimateSensorPort;
use crate::error::SensorError;

pub struct DhtSensor<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> DhtSensor<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }
}

fn sensor_error<E>(e: &DhtError<E>) -> SensorError {
    match e {
        DhtError::ChecksumMismatch => SensorError::Checksum,
        DhtError::Timeout => SensorError::Timeout,
        _ => SensorError::Gpio,
    }
}

impl<P, D> ClimateSensorPort for DhtSensor<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn begin(&mut self) {
        // Idle level for the open-drain bus is high.
        if self.pin.set_high().is_err() {
            warn!("DHT11: could not release data line");
        }
    }

    fn read(&mut self) -> ClimateReading {
        match dht11::blocking::read(&mut self.delay, &mut self.pin) {
            Ok(reading) => {
                let t = f32::from(reading.temperature);
                let h = f32::from(reading.relative_humidity);
                info!("DHT11: {:.1} °C | {:.1} %", t, h);
                ClimateReading::new(t, h)
            }
            Err(e) => {
                warn!("DHT11: read failed ({}, {:?})", sensor_error(&e), e);
                ClimateReading::INVALID
            }
        }
    }
}

//! WiFi station-mode adapter.
//!
//! Implements [`RadioPort`], the hexagonal boundary for the network radio.
//! Connection is split into a non-blocking [`begin_connect`] and a cheap
//! [`is_connected`] query; the bounded poll loop lives in the sequencer so
//! its timing can be tested without a radio.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation that associates after a configurable
//!   number of polls (or never).
//!
//! [`begin_connect`]: RadioPort::begin_connect
//! [`is_connected`]: RadioPort::is_connected

use log::{info, warn};

use crate::app::ports::RadioPort;
use crate::error::RadioError;

#[cfg(target_os = "espidf")]
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::EspWifi;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), RadioError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(RadioError::InvalidCredentials);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), RadioError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(RadioError::InvalidCredentials);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct WifiAdapter {
    wifi: EspWifi<'static>,
    started: bool,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    pub fn new(wifi: EspWifi<'static>) -> Self {
        Self {
            wifi,
            started: false,
        }
    }

    fn ensure_started(&mut self) -> Result<(), RadioError> {
        if self.started {
            return Ok(());
        }
        self.wifi.start().map_err(|e| {
            warn!("WiFi: start failed ({})", e);
            RadioError::StartFailed
        })?;
        self.started = true;
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
impl RadioPort for WifiAdapter {
    fn begin_connect(&mut self, ssid: &str, password: &str) -> Result<(), RadioError> {
        validate_ssid(ssid)?;
        validate_password(password)?;

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| RadioError::InvalidCredentials)?,
            password: password.try_into().map_err(|_| RadioError::InvalidCredentials)?,
            auth_method,
            ..Default::default()
        });
        self.wifi.set_configuration(&config).map_err(|e| {
            warn!("WiFi: set_configuration failed ({})", e);
            RadioError::StartFailed
        })?;
        self.ensure_started()?;

        // Non-blocking: association completes in the driver task.
        self.wifi.connect().map_err(|e| {
            warn!("WiFi: connect request failed ({})", e);
            RadioError::StartFailed
        })?;
        info!("WiFi: connecting to '{}'", ssid);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        // Associated is not enough: the upload needs an IP.
        self.wifi.is_connected().unwrap_or(false) && self.wifi.sta_netif().is_up().unwrap_or(false)
    }

    fn disconnect(&mut self) {
        if self.started {
            if let Err(e) = self.wifi.disconnect() {
                warn!("WiFi: disconnect failed ({})", e);
            }
        }
    }

    fn power_on(&mut self) {
        let config = Configuration::Client(ClientConfiguration::default());
        if let Err(e) = self.wifi.set_configuration(&config) {
            warn!("WiFi: set_configuration failed ({})", e);
            return;
        }
        if self.ensure_started().is_ok() {
            info!("WiFi: radio on (station, idle)");
        }
    }

    fn power_off(&mut self) {
        if !self.started {
            return;
        }
        match self.wifi.stop() {
            Ok(()) => {
                self.started = false;
                info!("WiFi: radio off");
            }
            Err(e) => warn!("WiFi: stop failed ({})", e),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct WifiAdapter {
    powered: bool,
    connecting: bool,
    /// Polls of `is_connected` before association succeeds; `None` never does.
    connect_after_polls: Option<u32>,
    polls: core::cell::Cell<u32>,
    ssid: heapless::String<32>,
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new_simulated(connect_after_polls: Option<u32>) -> Self {
        Self {
            powered: false,
            connecting: false,
            connect_after_polls,
            polls: core::cell::Cell::new(0),
            ssid: heapless::String::new(),
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn polls(&self) -> u32 {
        self.polls.get()
    }
}

#[cfg(not(target_os = "espidf"))]
impl RadioPort for WifiAdapter {
    fn begin_connect(&mut self, ssid: &str, password: &str) -> Result<(), RadioError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| RadioError::InvalidCredentials)?;
        self.powered = true;
        self.connecting = true;
        self.polls.set(0);
        info!("WiFi(sim): connecting to '{}'", self.ssid);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        if !self.connecting {
            return false;
        }
        let n = self.polls.get().saturating_add(1);
        self.polls.set(n);
        self.connect_after_polls.is_some_and(|after| n > after)
    }

    fn disconnect(&mut self) {
        if self.connecting {
            info!("WiFi(sim): disconnected from '{}'", self.ssid);
        }
        self.connecting = false;
    }

    fn power_on(&mut self) {
        self.powered = true;
        info!("WiFi(sim): radio on");
    }

    fn power_off(&mut self) {
        self.connecting = false;
        self.powered = false;
        info!("WiFi(sim): radio off");
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

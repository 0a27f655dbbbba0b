//! Deep-sleep lifecycle.
//!
//! [`PowerManager`] implements [`SuspendPort`]: it reports why the chip
//! booted and performs the final hard transition into timer-woken deep
//! sleep.  Only RTC slow memory survives that transition; the next wake
//! re-enters `main` from the top.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_sleep_*` calls; `sleep_for` never returns.
//! - **all other targets**: records the requested duration and returns.

use log::info;

use crate::app::ports::SuspendPort;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const US_PER_SEC: u64 = 1_000_000;

/// Why this program run started.  Only the timer is an expected source;
/// everything else is logged and otherwise treated like a timer wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// The deep-sleep timer fired.
    Timer,
    /// Power-on, flash, or any reset that was not a deep-sleep wake.
    PowerOn,
    /// Some other wake source, with the raw `esp_sleep_wakeup_cause_t`.
    Other(u32),
}

impl WakeReason {
    #[cfg(target_os = "espidf")]
    fn from_raw(cause: esp_sleep_wakeup_cause_t) -> Self {
        #[allow(non_upper_case_globals)]
        match cause {
            esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER => Self::Timer,
            esp_sleep_source_t_ESP_SLEEP_WAKEUP_UNDEFINED => Self::PowerOn,
            other => Self::Other(other),
        }
    }
}

pub struct PowerManager {
    wake_reason: WakeReason,
    /// Simulation: the last duration passed to `sleep_for`.
    #[cfg(not(target_os = "espidf"))]
    last_sleep_secs: Option<u64>,
}

impl PowerManager {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        // SAFETY: plain query of the RTC wake cause register.
        let cause = unsafe { esp_sleep_get_wakeup_cause() };
        Self {
            wake_reason: WakeReason::from_raw(cause),
        }
    }

    /// Simulation: pretend the chip came up for `wake_reason`.
    #[cfg(not(target_os = "espidf"))]
    pub fn new_simulated(wake_reason: WakeReason) -> Self {
        Self {
            wake_reason,
            last_sleep_secs: None,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn last_sleep_secs(&self) -> Option<u64> {
        self.last_sleep_secs
    }
}

impl SuspendPort for PowerManager {
    fn wake_reason(&self) -> WakeReason {
        self.wake_reason
    }

    fn flush_log(&mut self) {
        use std::io::Write;
        log::logger().flush();
        let _ = std::io::stdout().flush();
    }

    #[cfg(target_os = "espidf")]
    fn sleep_for(&mut self, duration_secs: u64) {
        // SAFETY: both calls only program the RTC timer and power domains;
        // the peripherals that matter were released by the caller.
        unsafe {
            esp_sleep_enable_timer_wakeup(duration_secs.saturating_mul(US_PER_SEC));
            info!("power: entering deep sleep for {} s", duration_secs);
            esp_deep_sleep_start();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn sleep_for(&mut self, duration_secs: u64) {
        info!(
            "power(sim): deep sleep for {} s ({} µs timer)",
            duration_secs,
            duration_secs.saturating_mul(US_PER_SEC)
        );
        self.last_sleep_secs = Some(duration_secs);
    }
}

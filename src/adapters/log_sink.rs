//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each [`WakeEvent`] as one line to
//! the ESP-IDF logger (UART on the ESP32-CAM).

use log::{info, warn};

use crate::app::events::WakeEvent;
use crate::app::ports::EventSink;
use crate::power::WakeReason;
use crate::sequencer::PhotoOutcome;

/// Adapter that logs every [`WakeEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &WakeEvent) {
        match event {
            WakeEvent::Booted { reason, tally } => {
                let cause = match reason {
                    WakeReason::Timer => "timer".to_string(),
                    WakeReason::PowerOn => "power-on".to_string(),
                    WakeReason::Other(code) => format!("other ({})", code),
                };
                info!(
                    "BOOT  | wake #{} | cause={} | first_boot={}",
                    tally.total_wake_count, cause, tally.first_boot
                );
            }
            WakeEvent::Classified {
                classification,
                wakes_since_last_photo,
                wakes_needed,
            } => {
                info!(
                    "CLASS | {:?} | since_photo={}/{}",
                    classification, wakes_since_last_photo, wakes_needed
                );
            }
            WakeEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            WakeEvent::KeepAliveDone(strategy) => {
                info!("KEEP  | {:?} done", strategy);
            }
            WakeEvent::PhotoFinished(report) => match report.outcome {
                PhotoOutcome::Uploaded { status } => info!(
                    "PHOTO | uploaded {} bytes | HTTP {} | T={:?} H={:?}",
                    report.frame_len.unwrap_or(0),
                    status,
                    report.climate.temperature_c,
                    report.climate.humidity_pct
                ),
                _ => {
                    for e in report.errors() {
                        warn!("PHOTO | failed: {}", e);
                    }
                }
            },
            WakeEvent::Suspending { duration_secs } => {
                info!("SLEEP | {} s", duration_secs);
            }
        }
    }
}

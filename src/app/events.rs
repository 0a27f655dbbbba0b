//! Outbound wake events.
//!
//! The [`WakeService`](super::service::WakeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; the only one today writes log lines.

use crate::cycle::WakeTally;
use crate::fsm::StateId;
use crate::fsm::context::KeepAliveStrategy;
use crate::policy::WakeClassification;
use crate::power::WakeReason;
use crate::sequencer::PhotoReport;

/// Structured events emitted during one wake.
#[derive(Debug, Clone)]
pub enum WakeEvent {
    /// The wake was counted.
    Booted { reason: WakeReason, tally: WakeTally },

    /// The interval policy decided what this wake does.
    Classified {
        classification: WakeClassification,
        wakes_since_last_photo: u32,
        wakes_needed: u32,
    },

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The keep-alive load pulse ran.
    KeepAliveDone(KeepAliveStrategy),

    /// A photo attempt finished, successful or not.
    PhotoFinished(PhotoReport),

    /// About to enter deep sleep.
    Suspending { duration_secs: u64 },
}

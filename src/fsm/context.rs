//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the blackboard between the pure state handlers and the
//! wake service.  Handlers read the wake tally and configuration, decide,
//! and post at most one [`WakeAction`]; the service performs it against
//! the hardware ports, fills in any results, and marks it complete.

use crate::config::{Capabilities, IntervalConfig};
use crate::cycle::WakeTally;
use crate::policy::WakeClassification;

// ---------------------------------------------------------------------------
// Actions (written by state handlers; carried out by the wake service)
// ---------------------------------------------------------------------------

/// How a keep-alive wake draws its burst of current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepAliveStrategy {
    /// Flash LED at full power for a short hold.
    FlashPulse,
    /// Radio on, brief hold, radio off.  For boards without a flash LED.
    RadioPulse,
}

impl KeepAliveStrategy {
    pub fn for_capabilities(capabilities: &Capabilities) -> Self {
        if capabilities.has_flash_led {
            Self::FlashPulse
        } else {
            Self::RadioPulse
        }
    }
}

/// Side effect requested by a state handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeAction {
    /// Load and advance the persistent cycle counter; result goes to
    /// [`FsmContext::tally`].
    CountWake,
    KeepAlive(KeepAliveStrategy),
    /// Run the capture-and-upload sequence, then reset the photo counter.
    PhotoSequence,
    /// Release the radio and enter timed deep sleep.
    Suspend { duration_secs: u64 },
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Configuration --
    pub intervals: IntervalConfig,
    pub capabilities: Capabilities,
    /// Cached `ceil(photo / keep_alive)`.
    pub wakes_needed: u32,

    // -- Wake data --
    /// Set once `CountWake` has run.
    pub tally: Option<WakeTally>,
    /// Set on entry to `Classifying`.
    pub classification: Option<WakeClassification>,

    // -- Action hand-off --
    pending: Option<WakeAction>,
    action_done: bool,
}

impl FsmContext {
    pub fn new(intervals: IntervalConfig, capabilities: Capabilities) -> Self {
        Self {
            wakes_needed: intervals.wakes_needed_for_photo(),
            intervals,
            capabilities,
            tally: None,
            classification: None,
            pending: None,
            action_done: false,
        }
    }

    /// Post `action` for the service; clears the completion flag.
    pub fn request(&mut self, action: WakeAction) {
        self.pending = Some(action);
        self.action_done = false;
    }

    /// Take the posted action, if any.
    pub fn take_pending(&mut self) -> Option<WakeAction> {
        self.pending.take()
    }

    /// Called by the service once the taken action has been carried out.
    pub fn complete(&mut self) {
        self.action_done = true;
    }

    /// The last requested action has been carried out.
    pub fn action_done(&self) -> bool {
        self.action_done && self.pending.is_none()
    }

    /// Deep-sleep duration after every wake, photo or not.
    pub fn sleep_secs(&self) -> u64 {
        u64::from(self.intervals.keep_alive_interval_secs)
    }
}

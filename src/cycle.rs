//! Persistent cycle counter.
//!
//! The only state that outlives a wake.  It lives in a
//! [`RetainedStore`](crate::app::ports::RetainedStore) (RTC slow memory on
//! the device), is loaded once at boot, advanced once per wake and written
//! back immediately after every mutation, so a brown-out mid-wake loses at
//! most the current wake's bookkeeping.
//!
//! Counts are plain `u32` with wrapping increments; overflow needs more
//! than ten thousand years at a 90 s cadence.

use log::info;
use serde::{Deserialize, Serialize};

use crate::app::ports::RetainedStore;

/// Counter set retained across deep sleep.  Zeroed on power-on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentState {
    /// Every wake since power-on or flash, including this one.
    pub total_wake_count: u32,
    /// Wakes since the last photo attempt.
    pub wakes_since_last_photo: u32,
}

/// Result of [`CycleCounter::advance_and_classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeTally {
    pub first_boot: bool,
    pub total_wake_count: u32,
    pub wakes_since_last_photo: u32,
}

/// Owns the retained counters for the duration of one wake.
pub struct CycleCounter<'a> {
    state: PersistentState,
    store: &'a mut dyn RetainedStore,
}

impl<'a> CycleCounter<'a> {
    /// Load the retained state, or start from zero if none is valid.
    pub fn load(store: &'a mut dyn RetainedStore) -> Self {
        let state = store.load().unwrap_or_else(|| {
            info!("cycle: no retained state, starting from zero");
            PersistentState::default()
        });
        Self { state, store }
    }

    pub fn state(&self) -> PersistentState {
        self.state
    }

    /// Count this wake.
    ///
    /// On the very first wake (`total_wake_count` becomes 1) the photo
    /// counter is forced to zero whatever garbage it held, and the wake is
    /// reported as first boot.  Otherwise the photo counter steps by one.
    pub fn advance_and_classify(&mut self) -> WakeTally {
        self.state.total_wake_count = self.state.total_wake_count.wrapping_add(1);
        let first_boot = self.state.total_wake_count == 1;

        if first_boot {
            self.state.wakes_since_last_photo = 0;
        } else {
            self.state.wakes_since_last_photo = self.state.wakes_since_last_photo.wrapping_add(1);
        }
        self.persist();

        WakeTally {
            first_boot,
            total_wake_count: self.state.total_wake_count,
            wakes_since_last_photo: self.state.wakes_since_last_photo,
        }
    }

    /// Called once per photo attempt, successful or not.
    pub fn reset_photo_counter(&mut self) {
        self.state.wakes_since_last_photo = 0;
        self.persist();
    }

    fn persist(&mut self) {
        self.store.store(&self.state);
    }
}

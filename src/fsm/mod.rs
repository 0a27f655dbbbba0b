//! Wake scheduler: a table of plain `fn` handlers, one row per phase.
//!
//! ```text
//!   Booting ──CountWake──▶ Classifying ──┬─▶ RunningKeepAlive ─────┐
//!                                        │   (flash or radio)      ▼
//!                                        └─▶ RunningPhotoSequence ─▶ Suspending
//!                                            (counter reset)        (deep sleep)
//! ```
//!
//! A wake walks `Booting -> Classifying -> Running* -> Suspending` and
//! never returns to an earlier phase.  Handlers never touch hardware:
//! they read the counters in [`FsmContext`] and post a
//! [`WakeAction`](context::WakeAction) that the wake service carries out
//! before the next tick.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

/// Phases of one wake, in the order they run.  Discriminants index the
/// table from [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Booting = 0,
    Classifying = 1,
    RunningKeepAlive = 2,
    RunningPhotoSequence = 3,
    Suspending = 4,
}

impl StateId {
    pub const COUNT: usize = 5;

    /// Out-of-range indices map to `Suspending` so a bad index still ends
    /// the wake asleep; debug builds assert instead.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Booting,
            1 => Self::Classifying,
            2 => Self::RunningKeepAlive,
            3 => Self::RunningPhotoSequence,
            4 => Self::Suspending,
            _ => {
                debug_assert!(false, "no wake phase at index {idx}");
                Self::Suspending
            }
        }
    }

    /// No state follows this one within a wake.
    pub fn is_terminal(self) -> bool {
        self == Self::Suspending
    }
}

/// Entry or exit hook.  Entry hooks post the phase's action.
pub type StateActionFn = fn(&mut FsmContext);

/// Returns the next phase once the posted action is done.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

/// Wake-phase machine.  Lives for a single wake; the only state that
/// survives deep sleep is the cycle counter in RTC memory.
pub struct Fsm {
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    tick_count: u64,
    state_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Enter the initial state.  Call once per wake, before `tick`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM: wake begins in {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Poll the current phase once.  A phase only advances after the
    /// service has completed the action it posted.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        self.tick_count += 1;
        if let Some(next_id) = (self.table[self.current].on_update)(ctx) {
            self.transition(next_id, ctx);
        }
    }

    /// Jump straight to `next`; the service uses this to end an overrun
    /// wake in `Suspending`.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Ticks spent waiting in the current phase.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;
        info!(
            "FSM: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }
        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        // May post the next phase's action.
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

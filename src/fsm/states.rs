//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.  Handlers only decide; every side effect
//! goes out as a [`WakeAction`] for the wake service.
//!
//! ```text
//!  BOOTING ──[wake counted]──▶ CLASSIFYING
//!                                 │      │
//!                        [photo wake]  [keep-alive wake]
//!                                 ▼      ▼
//!              RUNNING_PHOTO_SEQUENCE  RUNNING_KEEP_ALIVE
//!                                 │      │
//!                              [action done]
//!                                 ▼      ▼
//!                               SUSPENDING  (terminal)
//! ```

use super::context::{FsmContext, KeepAliveStrategy, WakeAction};
use super::{StateDescriptor, StateId};
use crate::policy::{self, WakeClassification};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once per wake.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Booting
        StateDescriptor {
            id: StateId::Booting,
            name: "Booting",
            on_enter: Some(booting_enter),
            on_exit: None,
            on_update: booting_update,
        },
        // Index 1: Classifying
        StateDescriptor {
            id: StateId::Classifying,
            name: "Classifying",
            on_enter: Some(classifying_enter),
            on_exit: None,
            on_update: classifying_update,
        },
        // Index 2: RunningKeepAlive
        StateDescriptor {
            id: StateId::RunningKeepAlive,
            name: "RunningKeepAlive",
            on_enter: Some(keep_alive_enter),
            on_exit: None,
            on_update: action_then_suspend,
        },
        // Index 3: RunningPhotoSequence
        StateDescriptor {
            id: StateId::RunningPhotoSequence,
            name: "RunningPhotoSequence",
            on_enter: Some(photo_enter),
            on_exit: Some(photo_exit),
            on_update: action_then_suspend,
        },
        // Index 4: Suspending
        StateDescriptor {
            id: StateId::Suspending,
            name: "Suspending",
            on_enter: Some(suspending_enter),
            on_exit: None,
            on_update: suspending_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  BOOTING
// ═══════════════════════════════════════════════════════════════════════════

fn booting_enter(ctx: &mut FsmContext) {
    ctx.request(WakeAction::CountWake);
}

fn booting_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.action_done() && ctx.tally.is_some() {
        return Some(StateId::Classifying);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CLASSIFYING (pure interval policy)
// ═══════════════════════════════════════════════════════════════════════════

fn classifying_enter(ctx: &mut FsmContext) {
    let Some(tally) = ctx.tally else {
        // Unreachable via booting_update; classify as keep-alive so the
        // wake still ends in sleep.
        warn!("CLASSIFYING: no tally, defaulting to keep-alive");
        ctx.classification = Some(WakeClassification::KeepAliveWake);
        return;
    };

    info!(
        "CLASSIFYING: wakes since last photo {} / {}",
        tally.wakes_since_last_photo, ctx.wakes_needed
    );
    let class = policy::classify(tally.first_boot, tally.wakes_since_last_photo, ctx.wakes_needed);
    if tally.first_boot {
        info!("CLASSIFYING: first boot, taking initial photo");
    }
    info!("CLASSIFYING: {:?}", class);
    ctx.classification = Some(class);
}

fn classifying_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.classification {
        Some(WakeClassification::PhotoWake) => Some(StateId::RunningPhotoSequence),
        Some(WakeClassification::KeepAliveWake) | None => Some(StateId::RunningKeepAlive),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING_KEEP_ALIVE / RUNNING_PHOTO_SEQUENCE
// ═══════════════════════════════════════════════════════════════════════════

fn keep_alive_enter(ctx: &mut FsmContext) {
    let strategy = KeepAliveStrategy::for_capabilities(&ctx.capabilities);
    info!("KEEP_ALIVE: {:?}", strategy);
    ctx.request(WakeAction::KeepAlive(strategy));
}

fn photo_enter(ctx: &mut FsmContext) {
    info!("PHOTO: starting capture-and-upload");
    ctx.request(WakeAction::PhotoSequence);
}

fn photo_exit(_ctx: &mut FsmContext) {
    info!("PHOTO: attempt finished, photo counter reset");
}

/// Both running states end the same way, whatever the action achieved.
fn action_then_suspend(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.action_done().then_some(StateId::Suspending)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SUSPENDING (terminal)
// ═══════════════════════════════════════════════════════════════════════════

fn suspending_enter(ctx: &mut FsmContext) {
    let duration_secs = ctx.sleep_secs();
    info!("SUSPENDING: next wake in {} s", duration_secs);
    ctx.request(WakeAction::Suspend { duration_secs });
}

fn suspending_update(_ctx: &mut FsmContext) -> Option<StateId> {
    None
}

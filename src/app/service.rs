//! Wake service: the sleep scheduler.
//!
//! [`WakeService`] owns the FSM and its context for one wake.  It runs the
//! state machine from `Booting` to `Suspending`, carrying out each
//! [`WakeAction`] the handlers post against the port traits in a [`Board`].
//!
//! ```text
//!  RetainedStore ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                    │        WakeService          │
//!        Board   ◀──│  FSM · CycleCounter · Seq   │
//!                    └────────────────────────────┘
//! ```
//!
//! Every path ends in `Suspending`.  On hardware `sleep_for` does not
//! return; on the host the service hands back a [`WakeReport`].

use log::{info, warn};

use crate::config::{DeviceConfig, IntervalConfig};
use crate::cycle::{CycleCounter, WakeTally};
use crate::fsm::context::{FsmContext, KeepAliveStrategy, WakeAction};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::policy::WakeClassification;
use crate::power::WakeReason;
use crate::sequencer::{CaptureSequencer, PhotoReport};

use super::events::WakeEvent;
use super::ports::{Board, EventSink, RetainedStore};

/// Upper bound on FSM ticks per wake.  A normal wake needs five.
const MAX_TICKS_PER_WAKE: u32 = 32;

/// What one wake did.
#[derive(Debug, Clone, PartialEq)]
pub struct WakeReport {
    pub reason: WakeReason,
    pub tally: Option<WakeTally>,
    pub classification: Option<WakeClassification>,
    pub keep_alive: Option<KeepAliveStrategy>,
    pub photo: Option<PhotoReport>,
    pub sleep_secs: u64,
    pub final_state: StateId,
}

impl WakeReport {
    fn new(reason: WakeReason) -> Self {
        Self {
            reason,
            tally: None,
            classification: None,
            keep_alive: None,
            photo: None,
            sleep_secs: 0,
            final_state: StateId::Booting,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// WakeService
// ───────────────────────────────────────────────────────────────

pub struct WakeService {
    fsm: Fsm,
    ctx: FsmContext,
    config: DeviceConfig,
}

impl WakeService {
    /// Build the service.  Invalid intervals are logged and replaced by
    /// the defaults so the device keeps cycling.
    pub fn new(mut config: DeviceConfig) -> Self {
        if let Err(e) = config.intervals.validate() {
            warn!("config: {}, using default intervals", e);
            config.intervals = IntervalConfig::default();
        }
        if config.intervals.exceeds_powerbank_limit() {
            warn!(
                "config: keep-alive interval {} s exceeds typical powerbank auto-off",
                config.intervals.keep_alive_interval_secs
            );
        }
        if config.network.uses_placeholders() {
            warn!("config: network credentials are placeholders, uploads will fail");
        }

        let ctx = FsmContext::new(config.intervals, config.capabilities);
        let fsm = Fsm::new(build_state_table(), StateId::Booting);
        Self { fsm, ctx, config }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Run one complete wake.  May be called again to simulate the next
    /// wake; only `store` carries state across.
    pub fn run_wake(
        &mut self,
        board: &mut Board<'_>,
        store: &mut dyn RetainedStore,
        sink: &mut dyn EventSink,
    ) -> WakeReport {
        let mut report = WakeReport::new(board.power.wake_reason());
        let mut counter = CycleCounter::load(store);

        // Every wake starts from scratch, as after a real deep-sleep reset.
        self.ctx = FsmContext::new(self.config.intervals, self.config.capabilities);
        self.fsm = Fsm::new(build_state_table(), StateId::Booting);
        self.fsm.start(&mut self.ctx);

        for _ in 0..MAX_TICKS_PER_WAKE {
            if let Some(action) = self.ctx.take_pending() {
                self.execute(action, board, &mut counter, sink, &mut report);
                if matches!(action, WakeAction::Suspend { .. }) {
                    report.final_state = self.fsm.current_state();
                    return report;
                }
            }

            let prev = self.fsm.current_state();
            self.fsm.tick(&mut self.ctx);
            let next = self.fsm.current_state();
            if next != prev {
                sink.emit(&WakeEvent::StateChanged { from: prev, to: next });
            }

            if report.classification.is_none() {
                if let (Some(class), Some(tally)) = (self.ctx.classification, self.ctx.tally) {
                    report.classification = Some(class);
                    sink.emit(&WakeEvent::Classified {
                        classification: class,
                        wakes_since_last_photo: tally.wakes_since_last_photo,
                        wakes_needed: self.ctx.wakes_needed,
                    });
                }
            }
        }

        let prev = self.fsm.current_state();
        if !prev.is_terminal() {
            warn!(
                "wake: tick budget exhausted after {} ticks in {:?}, forcing suspension",
                self.fsm.ticks_in_current_state(),
                prev
            );
            self.fsm.force_transition(StateId::Suspending, &mut self.ctx);
            sink.emit(&WakeEvent::StateChanged {
                from: prev,
                to: StateId::Suspending,
            });
        }
        let duration_secs = self.ctx.sleep_secs();
        let action = self
            .ctx
            .take_pending()
            .unwrap_or(WakeAction::Suspend { duration_secs });
        self.execute(action, board, &mut counter, sink, &mut report);
        report.final_state = self.fsm.current_state();
        report
    }

    // ── Actions ───────────────────────────────────────────────

    fn execute(
        &mut self,
        action: WakeAction,
        board: &mut Board<'_>,
        counter: &mut CycleCounter<'_>,
        sink: &mut dyn EventSink,
        report: &mut WakeReport,
    ) {
        match action {
            WakeAction::CountWake => {
                let tally = counter.advance_and_classify();
                info!("boot count (total): {}", tally.total_wake_count);
                match report.reason {
                    WakeReason::Timer => info!("woken by timer"),
                    other => info!("woken by {:?}", other),
                }
                if tally.first_boot {
                    info!("first start after power-on or flash");
                }
                self.ctx.tally = Some(tally);
                report.tally = Some(tally);
                sink.emit(&WakeEvent::Booted {
                    reason: report.reason,
                    tally,
                });
            }
            WakeAction::KeepAlive(strategy) => {
                let used = self.keep_alive_pulse(strategy, board);
                report.keep_alive = Some(used);
                sink.emit(&WakeEvent::KeepAliveDone(used));
            }
            WakeAction::PhotoSequence => {
                let photo = CaptureSequencer::new(&self.config).run(board);
                // Attempted counts as taken, whatever the outcome.
                counter.reset_photo_counter();
                report.photo = Some(photo);
                sink.emit(&WakeEvent::PhotoFinished(photo));
            }
            WakeAction::Suspend { duration_secs } => {
                report.sleep_secs = duration_secs;
                self.suspend(duration_secs, board, sink);
            }
        }
        self.ctx.complete();
    }

    /// One short burst of current draw.  Falls back to the radio when the
    /// flash cannot be configured.  Returns the strategy actually used.
    fn keep_alive_pulse(&self, strategy: KeepAliveStrategy, board: &mut Board<'_>) -> KeepAliveStrategy {
        let timing = &self.config.timing;
        let mut used = strategy;

        if strategy == KeepAliveStrategy::FlashPulse {
            match board.flash.configure() {
                Ok(()) => {
                    board.flash.set_intensity(timing.keep_alive_flash_duty);
                    board.delay.delay_ms(timing.keep_alive_flash_ms);
                    board.flash.set_intensity(0);
                }
                Err(e) => {
                    warn!("keep-alive: flash unavailable ({}), pulsing radio", e);
                    used = KeepAliveStrategy::RadioPulse;
                }
            }
        }
        if used == KeepAliveStrategy::RadioPulse {
            board.radio.power_on();
            board.delay.delay_ms(timing.keep_alive_radio_ms);
            board.radio.power_off();
        }

        board.delay.delay_ms(timing.keep_alive_pause_ms);
        used
    }

    fn suspend(&self, duration_secs: u64, board: &mut Board<'_>, sink: &mut dyn EventSink) {
        board.radio.disconnect();
        board.radio.power_off();
        sink.emit(&WakeEvent::Suspending { duration_secs });
        info!("sleeping for {} s", duration_secs);
        board.power.flush_log();
        board.delay.delay_ms(self.config.timing.log_flush_ms);
        board.power.sleep_for(duration_secs);
    }
}

//! Clock control, tick dispatch and mode switching.

use super::core::{seed_rng, Engine};
use super::results::TickOutcome;
use crate::events::{EventEmitter, EventKind, EventPayload, ModeChangeEvent};
use crate::types::Mode;
use tracing::{debug, info};

impl Engine {
    /// Idempotent. Logs a start event only on an actual transition.
    pub fn start(&mut self) {
        if self.clock.start() {
            info!(tick = self.clock.tick(), mode = %self.mode, "simulation started");
            self.emit_event(EventKind::Start, format!("started at tick {}", self.clock.tick()), None);
        }
    }

    /// Idempotent. Once stopped, `tick` does nothing until the next `start`.
    pub fn stop(&mut self) {
        if self.clock.stop() {
            info!(tick = self.clock.tick(), mode = %self.mode, "simulation stopped");
            self.emit_event(EventKind::Stop, format!("stopped at tick {}", self.clock.tick()), None);
        }
    }

    pub fn toggle(&mut self) {
        if self.clock.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Host timer callback. A no-op returning `None` while stopped.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.clock.is_running() {
            return None;
        }
        Some(self.step_once())
    }

    /// Advance exactly one tick of the active model, running or not.
    pub fn step_once(&mut self) -> TickOutcome {
        let tick = self.clock.advance();
        let mode = self.mode;
        let first_id = self.bus.next_id();

        self.bus.stamp(tick, mode);
        self.models.model_mut(mode).step(&mut self.rng, &mut self.bus);

        let events_logged = (self.bus.next_id().0 - first_id.0) as usize;
        debug!(tick, mode = %mode, events_logged, log_len = self.bus.len(), "tick");

        TickOutcome {
            tick,
            mode,
            events_logged,
        }
    }

    /// Headless helper: `step_once` `n` times.
    pub fn run_ticks(&mut self, n: u64) -> Vec<TickOutcome> {
        (0..n).map(|_| self.step_once()).collect()
    }

    /// Switch the model the clock drives. Other models keep their state.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        let from = std::mem::replace(&mut self.mode, mode);
        self.models.model_mut(mode).recompute();

        info!(%from, to = %mode, "mode changed");
        self.emit_event(
            EventKind::ModeChange,
            format!("mode {from} -> {mode}"),
            Some(EventPayload::ModeChange(ModeChangeEvent { from, to: mode })),
        );
    }

    /// Restore every model to the configured defaults, clear the log, rewind
    /// and stop the clock, then log a single reset event. Event ids keep counting.
    pub fn reset(&mut self) {
        self.clock.rewind();
        if self.config.seed.is_some() {
            self.rng = seed_rng(self.config.seed);
        }
        self.models.reset(&self.config.models);
        self.models.market_making.regen_ladder(&mut self.rng);
        self.bus.clear();

        info!(mode = %self.mode, "simulation reset");
        self.bus.stamp(0, self.mode);
        self.bus.log(EventKind::Reset, "reset to defaults".to_string(), None);
    }
}

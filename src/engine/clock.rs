// 8.2 engine/clock.rs: tick counter and run flag. only the engine mutates it.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationClock {
    tick: u64,
    running: bool,
}

impl SimulationClock {
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // returns false when already running
    pub(super) fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.running, true)
    }

    // returns false when already stopped
    pub(super) fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub(super) fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    pub(super) fn rewind(&mut self) {
        *self = Self::default();
    }
}

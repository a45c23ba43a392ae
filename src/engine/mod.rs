// 8.0: simulation engine. owns the clock, the active mode, every model and the
// event log. the host supplies the timer and calls tick(); nothing here blocks.

mod clock;
mod config;
mod core;
mod models;
mod params;
mod pool;
mod results;
mod ticks;

pub use clock::SimulationClock;
pub use config::EngineConfig;
pub use core::Engine;
pub use models::Models;
pub use results::{EngineError, TickOutcome};

// 8.0 engine/core.rs: main engine. holds the clock, every model and the log.

use super::clock::SimulationClock;
use super::config::EngineConfig;
use super::models::Models;
use super::results::EngineError;
use crate::amm::AmmModel;
use crate::events::{BusEvent, EventBus, EventEmitter, EventFilter, EventId, EventKind, EventPayload};
use crate::impermanent_loss::IlModel;
use crate::interest::InterestModel;
use crate::lending::LendingModel;
use crate::market_making::MarketMakingModel;
use crate::options::OptionModel;
use crate::perp::PerpModel;
use crate::types::Mode;
use rand::rngs::StdRng;
use rand::SeedableRng;

/** 8.1: main engine struct. all state lives here */
#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) clock: SimulationClock,
    pub(super) mode: Mode,
    pub(super) models: Models,
    pub(super) bus: EventBus,
    pub(super) rng: StdRng,
}

impl Engine {
    /// Validates the model config and builds every model from it.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.models.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let mut rng = seed_rng(config.seed);
        let mut models = Models::new(&config.models);
        models.market_making.regen_ladder(&mut rng);

        Self {
            clock: SimulationClock::default(),
            mode: config.initial_mode,
            bus: EventBus::new(config.max_events, config.initial_mode),
            models,
            rng,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> SimulationClock {
        self.clock
    }

    pub fn tick_count(&self) -> u64 {
        self.clock.tick()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn models(&self) -> &Models {
        &self.models
    }

    pub fn amm(&self) -> &AmmModel {
        &self.models.amm
    }

    pub fn interest(&self) -> &InterestModel {
        &self.models.interest
    }

    pub fn lending(&self) -> &LendingModel {
        &self.models.lending
    }

    pub fn market_making(&self) -> &MarketMakingModel {
        &self.models.market_making
    }

    pub fn perp(&self) -> &PerpModel {
        &self.models.perp
    }

    pub fn options(&self) -> &OptionModel {
        &self.models.options
    }

    pub fn il(&self) -> &IlModel {
        &self.models.il
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn events(&self) -> impl Iterator<Item = &BusEvent> {
        self.bus.iter()
    }

    pub fn recent_events(&self, count: usize) -> impl Iterator<Item = &BusEvent> {
        self.bus.recent(count)
    }

    pub fn filtered_events<'a>(&'a self, filter: &'a EventFilter) -> impl Iterator<Item = &'a BusEvent> + 'a {
        self.bus.filtered(filter)
    }

    pub(super) fn emit_event(&mut self, kind: EventKind, summary: String, payload: Option<EventPayload>) -> EventId {
        self.bus.stamp(self.clock.tick(), self.mode);
        self.bus.log(kind, summary, payload)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

pub(super) fn seed_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

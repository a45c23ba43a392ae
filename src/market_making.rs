// 12.0: market making desk. mid wanders, random fills hit our quotes and move
// inventory, and the displayed ladder is rebuilt on a fixed cadence.

use crate::book::{regen_book, BookSide, Ladder};
use crate::config::{DynamicsConfig, SimConfig};
use crate::events::{BookRegenEvent, EventEmitter, EventKind, EventPayload, FillEvent};
use crate::model::{non_negative, positive, symmetric_jitter, Model, ParamError};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

pub const MIN_LEVELS: usize = 5;
pub const MAX_LEVELS: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMakingParams {
    pub mid: f64,
    // full quoted spread in percent of mid, 0.2 = 20 bps
    pub spread_pct: f64,
    // per side, clamped to [5, 30]
    pub levels: usize,
    pub tick_bps: f64,
}

impl Default for MarketMakingParams {
    fn default() -> Self {
        Self {
            mid: 100.0,
            spread_pct: 0.2,
            levels: 12,
            tick_bps: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketMakingMetrics {
    pub best_bid: f64,
    pub best_ask: f64,
    pub inventory_notional: f64,
    pub fills: u64,
}

#[derive(Debug, Clone)]
pub struct MarketMakingModel {
    params: MarketMakingParams,
    dynamics: DynamicsConfig,
    inventory: i64,
    ticks_since_regen: u32,
    ladder: Ladder,
    metrics: MarketMakingMetrics,
}

impl MarketMakingModel {
    /// The ladder starts empty; call `regen_ladder` once an rng is at hand.
    pub fn new(mut params: MarketMakingParams, dynamics: DynamicsConfig) -> Self {
        params.levels = clamp_levels(params.levels);
        let mut model = Self {
            params,
            dynamics,
            inventory: 0,
            ticks_since_regen: 0,
            ladder: Ladder::default(),
            metrics: MarketMakingMetrics::default(),
        };
        model.recompute();
        model
    }

    pub fn params(&self) -> &MarketMakingParams {
        &self.params
    }

    pub fn metrics(&self) -> &MarketMakingMetrics {
        &self.metrics
    }

    pub fn inventory(&self) -> i64 {
        self.inventory
    }

    pub fn ladder(&self) -> &Ladder {
        &self.ladder
    }

    pub fn ticks_since_regen(&self) -> u32 {
        self.ticks_since_regen
    }

    /// Rebuild the ladder around the current mid without logging.
    pub fn regen_ladder(&mut self, rng: &mut dyn RngCore) {
        self.ladder = regen_book(self.params.mid, self.params.levels, self.params.tick_bps, rng);
        self.ticks_since_regen = 0;
    }

    pub fn set_mid(&mut self, mid: f64) -> Result<(), ParamError> {
        self.params.mid = positive("mid", mid)?;
        Ok(())
    }

    pub fn set_spread_pct(&mut self, spread_pct: f64) -> Result<(), ParamError> {
        self.params.spread_pct = non_negative("spread_pct", spread_pct)?;
        Ok(())
    }

    pub fn set_levels(&mut self, levels: usize) {
        self.params.levels = clamp_levels(levels);
    }

    pub fn set_tick_bps(&mut self, tick_bps: f64) -> Result<(), ParamError> {
        self.params.tick_bps = positive("tick_bps", tick_bps)?;
        Ok(())
    }

    fn quote(&self, side: BookSide) -> f64 {
        let half = self.params.spread_pct / 100.0 / 2.0;
        match side {
            BookSide::Bid => self.params.mid * (1.0 - half),
            BookSide::Ask => self.params.mid * (1.0 + half),
        }
    }

    fn maybe_fill(&mut self, rng: &mut dyn RngCore, events: &mut dyn EventEmitter) {
        let p = self.dynamics.fill_probability.clamp(0.0, 1.0);
        if !rng.gen_bool(p) {
            return;
        }

        let side = if rng.gen_bool(0.5) { BookSide::Bid } else { BookSide::Ask };
        let size = rng.gen_range(1..=self.dynamics.max_fill_size.max(1));
        let price = self.quote(side);
        self.inventory += side.inventory_sign() * size;
        self.metrics.fills += 1;
        let marked = self.ladder.mark_fill(side, price);

        events.log(
            EventKind::Fill,
            format!(
                "{} fill {} @ {:.4}{}: inventory {}",
                side.as_str(),
                size,
                price,
                marked
                    .map(|i| format!(" (level {})", i))
                    .unwrap_or_default(),
                self.inventory
            ),
            Some(EventPayload::Fill(FillEvent {
                side,
                size,
                price,
                inventory: self.inventory,
            })),
        );
    }
}

fn clamp_levels(levels: usize) -> usize {
    levels.clamp(MIN_LEVELS, MAX_LEVELS)
}

impl Model for MarketMakingModel {
    fn recompute(&mut self) {
        self.metrics.best_bid = self.quote(BookSide::Bid);
        self.metrics.best_ask = self.quote(BookSide::Ask);
        self.metrics.inventory_notional = self.inventory as f64 * self.params.mid;
    }

    fn step(&mut self, rng: &mut dyn RngCore, events: &mut dyn EventEmitter) {
        let jitter = symmetric_jitter(rng, self.dynamics.mid_jitter);
        self.params.mid = (self.params.mid + jitter).max(self.dynamics.price_floor);

        self.maybe_fill(rng, events);

        self.ticks_since_regen += 1;
        if self.ticks_since_regen >= self.dynamics.book_regen_interval.max(1) {
            self.regen_ladder(rng);
            events.log(
                EventKind::BookRegen,
                format!(
                    "ladder rebuilt around {:.4} with {} levels per side",
                    self.params.mid, self.params.levels
                ),
                Some(EventPayload::BookRegen(BookRegenEvent {
                    mid: self.params.mid,
                    levels: self.params.levels,
                })),
            );
        }

        self.recompute();
    }

    fn reset(&mut self, config: &SimConfig) {
        *self = Self::new(config.market_making.clone(), config.dynamics);
    }
}

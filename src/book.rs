//! Order-book ladder around a mid price.
//!
//! The ladder is a display book: `2 * levels + 1` price levels spaced
//! `tick_bps` apart, bids strictly below mid and asks strictly above, with
//! an empty level at mid itself. Sizes are random and the percentage
//! columns are normalized against the largest size on each side so the
//! depth bars always reach 100 on a non-empty side.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

pub const MIN_LEVEL_PRICE: f64 = 0.0001;
const MIN_LEVEL_SIZE: f64 = 1.0;
const MAX_LEVEL_SIZE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    Bid,
    Ask,
}

impl BookSide {
    // a bid fill means we bought, so inventory goes up
    pub fn inventory_sign(&self) -> i64 {
        match self {
            BookSide::Bid => 1,
            BookSide::Ask => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookSide::Bid => "bid",
            BookSide::Ask => "ask",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderLevel {
    pub price: f64,
    pub bid_size: f64,
    pub ask_size: f64,
    pub bid_pct: f64,
    pub ask_pct: f64,
    pub bid_filled: bool,
    pub ask_filled: bool,
}

impl LadderLevel {
    fn empty(price: f64) -> Self {
        Self {
            price,
            bid_size: 0.0,
            ask_size: 0.0,
            bid_pct: 0.0,
            ask_pct: 0.0,
            bid_filled: false,
            ask_filled: false,
        }
    }

    pub fn is_mid(&self) -> bool {
        self.bid_size == 0.0 && self.ask_size == 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ladder {
    // ascending by price
    levels: Vec<LadderLevel>,
    mid: f64,
}

impl Ladder {
    pub fn levels(&self) -> &[LadderLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Mid price the ladder was generated around.
    pub fn mid(&self) -> f64 {
        self.mid
    }

    pub fn mid_index(&self) -> usize {
        self.levels.len() / 2
    }

    pub fn best_bid(&self) -> Option<&LadderLevel> {
        self.levels.iter().rev().find(|l| l.bid_size > 0.0)
    }

    pub fn best_ask(&self) -> Option<&LadderLevel> {
        self.levels.iter().find(|l| l.ask_size > 0.0)
    }

    pub fn total_size(&self, side: BookSide) -> f64 {
        self.levels
            .iter()
            .map(|l| match side {
                BookSide::Bid => l.bid_size,
                BookSide::Ask => l.ask_size,
            })
            .sum()
    }

    /// Flags the level on `side` closest to `price`. Returns its index, or `None`
    /// when that side of the ladder is empty.
    pub fn mark_fill(&mut self, side: BookSide, price: f64) -> Option<usize> {
        let idx = self
            .levels
            .iter()
            .enumerate()
            .filter(|(_, l)| match side {
                BookSide::Bid => l.bid_size > 0.0,
                BookSide::Ask => l.ask_size > 0.0,
            })
            .min_by(|(_, a), (_, b)| {
                (a.price - price)
                    .abs()
                    .total_cmp(&(b.price - price).abs())
            })
            .map(|(i, _)| i)?;

        let level = &mut self.levels[idx];
        match side {
            BookSide::Bid => level.bid_filled = true,
            BookSide::Ask => level.ask_filled = true,
        }
        Some(idx)
    }

    pub fn filled_count(&self) -> usize {
        self.levels
            .iter()
            .map(|l| usize::from(l.bid_filled) + usize::from(l.ask_filled))
            .sum()
    }
}

/// Builds a fresh ladder. Fill flags start cleared.
pub fn regen_book(mid: f64, levels: usize, tick_bps: f64, rng: &mut dyn RngCore) -> Ladder {
    let step = tick_bps / 10_000.0 * mid;
    let offset = levels as i64;

    let mut out: Vec<LadderLevel> = (0..=2 * offset)
        .map(|i| {
            let price = (mid + (i - offset) as f64 * step).max(MIN_LEVEL_PRICE);
            let mut level = LadderLevel::empty(price);
            match i.cmp(&offset) {
                std::cmp::Ordering::Less => level.bid_size = random_size(rng),
                std::cmp::Ordering::Greater => level.ask_size = random_size(rng),
                std::cmp::Ordering::Equal => {}
            }
            level
        })
        .collect();

    let max_bid = out.iter().map(|l| l.bid_size).fold(0.0, f64::max);
    let max_ask = out.iter().map(|l| l.ask_size).fold(0.0, f64::max);
    for level in &mut out {
        level.bid_pct = pct(level.bid_size, max_bid);
        level.ask_pct = pct(level.ask_size, max_ask);
    }

    Ladder { levels: out, mid }
}

fn random_size(rng: &mut dyn RngCore) -> f64 {
    let raw = rng.gen_range(MIN_LEVEL_SIZE..=MAX_LEVEL_SIZE);
    (raw * 100.0).round() / 100.0
}

fn pct(size: f64, max: f64) -> f64 {
    if max > 0.0 {
        (size / max * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

// 11.0: every state change produces an event. the bus is a bounded FIFO; once
// it is full the oldest entry is evicted. events are never mutated after creation.

use crate::book::BookSide;
use crate::lending::PoolAction;
use crate::black_scholes::OptionKind;
use crate::types::{Mode, Price, Quote, Side, Timestamp, TradeDirection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

pub const DEFAULT_EVENT_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Swap,
    Accrue,
    PoolAction,
    Fill,
    BookRegen,
    PerpUpdate,
    OptionTick,
    IlDrift,
    ModeChange,
    ParamChange,
    Start,
    Stop,
    Reset,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Swap => "swap",
            EventKind::Accrue => "accrue",
            EventKind::PoolAction => "pool_action",
            EventKind::Fill => "fill",
            EventKind::BookRegen => "book_regen",
            EventKind::PerpUpdate => "perp_update",
            EventKind::OptionTick => "option_tick",
            EventKind::IlDrift => "il_drift",
            EventKind::ModeChange => "mode_change",
            EventKind::ParamChange => "param_change",
            EventKind::Start => "start",
            EventKind::Stop => "stop",
            EventKind::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub tick: u64,
    pub mode: Mode,
    pub kind: EventKind,
    pub summary: String,
    pub payload: Option<EventPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Swap(SwapEvent),
    Accrual(AccrualEvent),
    Pool(PoolEvent),
    Fill(FillEvent),
    BookRegen(BookRegenEvent),
    Perp(PerpEvent),
    OptionTick(OptionTickEvent),
    IlDrift(IlDriftEvent),
    ModeChange(ModeChangeEvent),
    ParamChange(ParamChangeEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapEvent {
    pub direction: TradeDirection,
    pub size: f64,
    pub fee: f64,
    pub x: f64,
    pub y: f64,
    pub price_before: f64,
    pub price_after: f64,
    pub slippage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualEvent {
    pub day: u32,
    pub increment: f64,
    pub accrued: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEvent {
    pub action: PoolAction,
    pub requested: Quote,
    pub applied: Quote,
    pub cash: Quote,
    pub borrows: Quote,
    pub utilization: Decimal,
    pub borrow_apr: f64,
    pub supply_apr: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillEvent {
    pub side: BookSide,
    pub size: i64,
    pub price: f64,
    pub inventory: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRegenEvent {
    pub mid: f64,
    pub levels: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerpEvent {
    pub side: Side,
    pub entry: Price,
    pub qty: Decimal,
    pub liquidation_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionTickEvent {
    pub kind: OptionKind,
    pub spot: f64,
    pub price: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IlDriftEvent {
    pub price_ratio: f64,
    pub il_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeChangeEvent {
    pub from: Mode,
    pub to: Mode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamChangeEvent {
    pub model: String,
}

pub trait EventEmitter {
    fn log(&mut self, kind: EventKind, summary: String, payload: Option<EventPayload>) -> EventId;
}

// 11.1: per-mode visibility mask for timeline views. default shows everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub amm: bool,
    pub interest: bool,
    pub marketmaking: bool,
    pub options: bool,
    pub il: bool,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl EventFilter {
    pub fn all() -> Self {
        Self {
            amm: true,
            interest: true,
            marketmaking: true,
            options: true,
            il: true,
        }
    }

    pub fn none() -> Self {
        Self {
            amm: false,
            interest: false,
            marketmaking: false,
            options: false,
            il: false,
        }
    }

    pub fn only(mode: Mode) -> Self {
        Self::none().with(mode, true)
    }

    #[must_use]
    pub fn with(mut self, mode: Mode, enabled: bool) -> Self {
        *self.flag_mut(mode) = enabled;
        self
    }

    pub fn allows(&self, mode: Mode) -> bool {
        match mode {
            Mode::Amm => self.amm,
            Mode::Interest => self.interest,
            Mode::MarketMaking => self.marketmaking,
            Mode::Options => self.options,
            Mode::Il => self.il,
        }
    }

    fn flag_mut(&mut self, mode: Mode) -> &mut bool {
        match mode {
            Mode::Amm => &mut self.amm,
            Mode::Interest => &mut self.interest,
            Mode::MarketMaking => &mut self.marketmaking,
            Mode::Options => &mut self.options,
            Mode::Il => &mut self.il,
        }
    }
}

/** 11.2: the log. tick and mode are stamped by the engine before it hands the bus to a model */
#[derive(Debug, Clone)]
pub struct EventBus {
    events: VecDeque<BusEvent>,
    capacity: usize,
    next_id: u64,
    tick: u64,
    mode: Mode,
}

impl EventBus {
    pub fn new(capacity: usize, mode: Mode) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(DEFAULT_EVENT_CAPACITY)),
            capacity: capacity.max(1),
            next_id: 1,
            tick: 0,
            mode,
        }
    }

    pub fn stamp(&mut self, tick: u64, mode: Mode) {
        self.tick = tick;
        self.mode = mode;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Id the next logged event will get.
    pub fn next_id(&self) -> EventId {
        EventId(self.next_id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BusEvent> {
        self.events.iter()
    }

    pub fn latest(&self) -> Option<&BusEvent> {
        self.events.back()
    }

    /// The last `count` events, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &BusEvent> {
        let start = self.events.len().saturating_sub(count);
        self.events.range(start..)
    }

    pub fn filtered<'a>(&'a self, filter: &'a EventFilter) -> impl Iterator<Item = &'a BusEvent> + 'a {
        self.events.iter().filter(move |e| filter.allows(e.mode))
    }

    // ids keep counting across a clear so an id is never handed out twice
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventEmitter for EventBus {
    fn log(&mut self, kind: EventKind, summary: String, payload: Option<EventPayload>) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;

        debug!(id = id.0, tick = self.tick, mode = %self.mode, kind = kind.as_str(), "{}", summary);

        self.events.push_back(BusEvent {
            id,
            timestamp: Timestamp::now(),
            tick: self.tick,
            mode: self.mode,
            kind,
            summary,
            payload,
        });

        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut bus = EventBus::new(DEFAULT_EVENT_CAPACITY, Mode::Amm);
        let a = bus.log(EventKind::Start, "start".into(), None);
        let b = bus.log(EventKind::Stop, "stop".into(), None);
        assert_eq!(a, EventId(1));
        assert_eq!(b, EventId(2));
        assert_eq!(bus.latest().unwrap().kind, EventKind::Stop);
    }

    #[test]
    fn stamp_is_captured_at_log_time() {
        let mut bus = EventBus::new(10, Mode::Amm);
        bus.stamp(7, Mode::Options);
        bus.log(EventKind::OptionTick, "tick".into(), None);
        bus.stamp(8, Mode::Il);

        let ev = bus.latest().unwrap();
        assert_eq!(ev.tick, 7);
        assert_eq!(ev.mode, Mode::Options);
    }

    #[test]
    fn evicts_oldest_first() {
        let mut bus = EventBus::new(3, Mode::Amm);
        for i in 0..5 {
            bus.log(EventKind::Swap, format!("swap {}", i), None);
        }
        let ids: Vec<u64> = bus.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn clear_keeps_id_sequence() {
        let mut bus = EventBus::new(10, Mode::Amm);
        bus.log(EventKind::Swap, "a".into(), None);
        bus.clear();
        assert!(bus.is_empty());
        let id = bus.log(EventKind::Reset, "reset".into(), None);
        assert_eq!(id, EventId(2));
    }

    #[test]
    fn filter_by_mode() {
        let mut bus = EventBus::new(10, Mode::Amm);
        bus.log(EventKind::Swap, "a".into(), None);
        bus.stamp(1, Mode::Il);
        bus.log(EventKind::IlDrift, "b".into(), None);

        let only_il = EventFilter::only(Mode::Il);
        let seen: Vec<_> = bus.filtered(&only_il).map(|e| e.kind).collect();
        assert_eq!(seen, vec![EventKind::IlDrift]);

        let none = EventFilter::none();
        assert_eq!(bus.filtered(&none).count(), 0);
        assert_eq!(bus.len(), 2);
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut bus = EventBus::new(10, Mode::Amm);
        for i in 0..4 {
            bus.log(EventKind::Swap, format!("{}", i), None);
        }
        let tail: Vec<u64> = bus.recent(2).map(|e| e.id.0).collect();
        assert_eq!(tail, vec![3, 4]);
        assert_eq!(bus.recent(100).count(), 4);
    }
}

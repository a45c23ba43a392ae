// playground-core: DeFi playground simulation engine.
// a set of independent didactic market models driven one tick at a time.
// all computation is synchronous with no external I/O; the host owns the timer.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Mode, Side, Price, Quote, Leverage, Bps
//   2.x  series.rs: points, sampling, viewport + path strings
//   3.x  model.rs: Model trait, ParamError, input validators
//   4.x  curves.rs: AMM kernels: constant product, weighted, stable-like, ticks
//   4.1  amm.rs: AMM model, swaps, concentrated position
//   5.x  interest.rs: simple vs compound accrual
//   6.x  rates.rs: utilization and borrow/supply curves
//   7.x  config.rs: model defaults, dynamics, presets
//   8.x  engine/: clock, mode dispatch, edits, pool actions, reset
//   9.3  lending.rs: utilization-based lending pool
//   10.x book.rs: bid/ask ladder generator
//   11.x events.rs: bounded event log and filters
//   12.x market_making.rs: mid walk, fills, inventory
//   13.x perp.rs: leveraged perp liquidation and PnL
//   14.x options.rs + black_scholes.rs: pricing, Greeks, payoff
//   15.x impermanent_loss.rs: 50/50 and 80/20 IL

// kernels
pub mod black_scholes;
pub mod curves;
pub mod rates;
pub mod series;
pub mod types;

// models
pub mod amm;
pub mod book;
pub mod impermanent_loss;
pub mod interest;
pub mod lending;
pub mod market_making;
pub mod model;
pub mod options;
pub mod perp;

// engine
pub mod config;
pub mod engine;
pub mod events;

// re exports for convenience
pub use amm::*;
pub use black_scholes::*;
pub use book::*;
pub use curves::*;
pub use engine::*;
pub use events::*;
pub use impermanent_loss::*;
pub use interest::*;
pub use lending::*;
pub use market_making::*;
pub use model::{Model, ParamError};
pub use options::*;
pub use perp::*;
pub use rates::*;
pub use series::*;
pub use types::*;
pub use config::{ConfigError, DynamicsConfig, Preset, SimConfig};

//! Validated parameter edits.
//!
//! Each `edit_*` runs the caller's setters against a scratch copy of the
//! model. Only when every setter succeeds is the copy recomputed and swapped
//! in, so a rejected edit leaves the live model untouched.

use super::core::Engine;
use super::models::Models;
use super::results::EngineError;
use crate::amm::AmmModel;
use crate::events::{EventEmitter, EventKind, EventPayload, ParamChangeEvent};
use crate::impermanent_loss::IlModel;
use crate::interest::InterestModel;
use crate::lending::LendingModel;
use crate::market_making::MarketMakingModel;
use crate::model::{Model, ParamError};
use crate::options::OptionModel;
use crate::perp::PerpModel;
use crate::types::Mode;
use tracing::warn;

impl Engine {
    pub fn edit_amm<F>(&mut self, edit: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut AmmModel) -> Result<(), ParamError>,
    {
        self.apply_edit("amm", |m| &mut m.amm, edit)?;
        self.log_param_change("amm", Mode::Amm);
        Ok(())
    }

    pub fn edit_interest<F>(&mut self, edit: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut InterestModel) -> Result<(), ParamError>,
    {
        self.apply_edit("interest", |m| &mut m.interest, edit)?;
        self.log_param_change("interest", Mode::Interest);
        Ok(())
    }

    pub fn edit_lending<F>(&mut self, edit: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut LendingModel) -> Result<(), ParamError>,
    {
        self.apply_edit("lending", |m| &mut m.lending, edit)?;
        self.log_param_change("lending", Mode::Interest);
        Ok(())
    }

    /// Ladder is rebuilt after every accepted edit so levels and spacing show immediately.
    pub fn edit_market_making<F>(&mut self, edit: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut MarketMakingModel) -> Result<(), ParamError>,
    {
        self.apply_edit("market_making", |m| &mut m.market_making, edit)?;
        self.models.market_making.regen_ladder(&mut self.rng);
        self.log_param_change("market_making", Mode::MarketMaking);
        Ok(())
    }

    /// Accepted perp edits re-run `compute_perps`, which logs the new snapshot.
    pub fn edit_perp<F>(&mut self, edit: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut PerpModel) -> Result<(), ParamError>,
    {
        self.apply_edit("perp", |m| &mut m.perp, edit)?;
        self.bus.stamp(self.clock.tick(), Mode::MarketMaking);
        self.models.perp.compute_perps(&mut self.bus);
        Ok(())
    }

    pub fn edit_options<F>(&mut self, edit: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut OptionModel) -> Result<(), ParamError>,
    {
        self.apply_edit("options", |m| &mut m.options, edit)?;
        self.log_param_change("options", Mode::Options);
        Ok(())
    }

    pub fn edit_il<F>(&mut self, edit: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut IlModel) -> Result<(), ParamError>,
    {
        self.apply_edit("il", |m| &mut m.il, edit)?;
        self.log_param_change("il", Mode::Il);
        Ok(())
    }

    fn apply_edit<M, S, F>(&mut self, name: &str, select: S, edit: F) -> Result<(), EngineError>
    where
        M: Model + Clone,
        S: FnOnce(&mut Models) -> &mut M,
        F: FnOnce(&mut M) -> Result<(), ParamError>,
    {
        let live = select(&mut self.models);
        let mut draft = live.clone();
        if let Err(e) = edit(&mut draft) {
            warn!(model = name, error = %e, "parameter edit rejected");
            return Err(e.into());
        }
        draft.recompute();
        *live = draft;
        Ok(())
    }

    // stamped with the edited model's mode so per-mode filters pick it up
    fn log_param_change(&mut self, name: &str, mode: Mode) {
        self.bus.stamp(self.clock.tick(), mode);
        self.bus.log(
            EventKind::ParamChange,
            format!("{name} parameters updated"),
            Some(EventPayload::ParamChange(ParamChangeEvent {
                model: name.to_string(),
            })),
        );
    }
}

// 8.3 engine/models.rs: every model, owned by the engine. mode picks which one the clock drives.

use crate::amm::AmmModel;
use crate::config::SimConfig;
use crate::impermanent_loss::IlModel;
use crate::interest::InterestModel;
use crate::lending::LendingModel;
use crate::market_making::MarketMakingModel;
use crate::model::Model;
use crate::options::OptionModel;
use crate::perp::PerpModel;
use crate::types::Mode;

#[derive(Debug, Clone)]
pub struct Models {
    pub amm: AmmModel,
    pub interest: InterestModel,
    // shown alongside interest, never tick driven
    pub lending: LendingModel,
    pub market_making: MarketMakingModel,
    // perp sub-mode of market making, never tick driven
    pub perp: PerpModel,
    pub options: OptionModel,
    pub il: IlModel,
}

impl Models {
    pub fn new(config: &SimConfig) -> Self {
        let d = config.dynamics;
        Self {
            amm: AmmModel::new(config.amm.clone(), d),
            interest: InterestModel::new(config.interest.clone(), d),
            lending: LendingModel::new(config.lending.clone(), d),
            market_making: MarketMakingModel::new(config.market_making.clone(), d),
            perp: PerpModel::new(config.perp.clone(), d),
            options: OptionModel::new(config.options.clone(), d),
            il: IlModel::new(config.il.clone(), d),
        }
    }

    /// The model a mode's ticks drive.
    pub fn model_mut(&mut self, mode: Mode) -> &mut dyn Model {
        match mode {
            Mode::Amm => &mut self.amm,
            Mode::Interest => &mut self.interest,
            Mode::MarketMaking => &mut self.market_making,
            Mode::Options => &mut self.options,
            Mode::Il => &mut self.il,
        }
    }

    pub fn reset(&mut self, config: &SimConfig) {
        let all: [&mut dyn Model; 7] = [
            &mut self.amm,
            &mut self.interest,
            &mut self.lending,
            &mut self.market_making,
            &mut self.perp,
            &mut self.options,
            &mut self.il,
        ];
        for model in all {
            model.reset(config);
        }
    }
}

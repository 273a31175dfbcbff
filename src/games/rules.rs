//! Validated configuration plus prebuilt outcome tables

use crate::common::types::{Money, Multiplier};
use crate::config::{EngineConfig, LimitsConfig};
use crate::errors::{EngineResult, ValidationError};
use crate::games::keno::KenoPaytable;
use crate::games::plinko::PlinkoTables;
use crate::games::types::{RiskLevel, SlotSymbol};
use crate::games::weighted::WeightedTable;
use crate::games::{slots, wheel};
use std::collections::HashMap;

/// Everything a generator needs besides its draws. Built once at startup.
#[derive(Debug, Clone)]
pub struct GameRules {
    config: EngineConfig,
    wheel: HashMap<RiskLevel, WeightedTable<Multiplier>>,
    slot_reel: WeightedTable<SlotSymbol>,
    plinko: PlinkoTables,
    keno: KenoPaytable,
}

impl GameRules {
    /// Validate `config` and build every table; any bad table fails here
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        config.validate()?;

        let mut wheel_tables = HashMap::new();
        for risk in RiskLevel::ALL {
            wheel_tables.insert(risk, wheel::build_table(risk)?);
        }

        Ok(Self {
            config: config.clone(),
            wheel: wheel_tables,
            slot_reel: slots::build_reel()?,
            plinko: PlinkoTables::standard()?,
            keno: KenoPaytable::standard()?,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.config.limits
    }

    pub fn wheel_table(&self, risk: RiskLevel) -> Option<&WeightedTable<Multiplier>> {
        self.wheel.get(&risk)
    }

    pub fn slot_reel(&self) -> &WeightedTable<SlotSymbol> {
        &self.slot_reel
    }

    pub fn plinko(&self) -> &PlinkoTables {
        &self.plinko
    }

    pub fn keno(&self) -> &KenoPaytable {
        &self.keno
    }

    /// Bet must lie in `[min_bet, max_bet]`
    pub fn check_bet(&self, bet: Money) -> Result<(), ValidationError> {
        let limits = self.limits();
        if bet < limits.min_bet {
            return Err(ValidationError::BetBelowMinimum {
                bet,
                min: limits.min_bet,
            });
        }
        if bet > limits.max_bet {
            return Err(ValidationError::BetAboveMaximum {
                bet,
                max: limits.max_bet,
            });
        }
        Ok(())
    }
}

//! Crash: a multiplier that grows each tick until a predetermined point
//!
//! The crash point is fixed when the round starts. Cash-outs are judged by
//! tick against the termination tick, so arrival order of requests cannot
//! change the result.

use crate::common::types::Multiplier;
use crate::config::CrashConfig;
use crate::errors::{EngineResult, ValidationError};
use crate::games::rules::GameRules;
use crate::games::types::ResultDetail;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

/// Round parameters taken from configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrashSetup {
    pub edge: f64,
    pub instant_bust_probability: f64,
    pub max_multiplier: f64,
    pub growth_per_tick: f64,
}

impl CrashSetup {
    pub fn from_rules(rules: &GameRules) -> Self {
        let CrashConfig {
            instant_bust_probability,
            max_multiplier,
            growth_per_tick,
        } = rules.config().crash.clone();
        Self {
            edge: rules.config().house_edge.crash,
            instant_bust_probability,
            max_multiplier,
            growth_per_tick,
        }
    }

    /// Displayed multiplier at `tick`: `floor2(e^(g * tick))`
    pub fn multiplier_at(&self, tick: u64) -> Multiplier {
        Multiplier::floor_from_f64((self.growth_per_tick * tick as f64).exp())
    }

    /// First tick whose multiplier reaches `crash_point`
    pub fn termination_tick(&self, crash_point: Multiplier) -> u64 {
        if crash_point <= Multiplier::ONE {
            return 0;
        }
        let estimate = (crash_point.as_f64().ln() / self.growth_per_tick).floor().max(0.0) as u64;
        let mut tick = estimate.saturating_sub(1);
        while tick > 0 && self.multiplier_at(tick - 1) >= crash_point {
            tick -= 1;
        }
        while self.multiplier_at(tick) < crash_point {
            tick += 1;
        }
        tick
    }
}

/// Where a round ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashPoint {
    pub multiplier: Multiplier,
    pub instant_bust: bool,
}

/// Draw the crash point.
///
/// The first draw decides an instant bust at 1.00x. Otherwise a second draw
/// `r` gives `max(1.00, floor2(100 / (r * (100 - edge%))))`, capped.
pub fn generate_crash_point(setup: &CrashSetup, rng: &mut dyn RandomSource) -> EngineResult<CrashPoint> {
    if rng.next_unit()? < setup.instant_bust_probability {
        return Ok(CrashPoint {
            multiplier: Multiplier::ONE,
            instant_bust: true,
        });
    }

    let cap = Multiplier::floor_from_f64(setup.max_multiplier);
    let r = rng.next_unit()?;
    let multiplier = if r > 0.0 {
        let edge_pct = setup.edge * 100.0;
        Multiplier::floor_from_f64(100.0 / (r * (100.0 - edge_pct)))
            .max(Multiplier::ONE)
            .min(cap)
    } else {
        cap
    };

    Ok(CrashPoint {
        multiplier,
        instant_bust: false,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrashStatus {
    Running,
    CashedOut { tick: u64, multiplier: Multiplier },
    Busted,
}

/// Interactive crash round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashRound {
    setup: CrashSetup,
    point: CrashPoint,
    termination_tick: u64,
    status: CrashStatus,
}

impl CrashRound {
    pub fn start(setup: CrashSetup, rng: &mut dyn RandomSource) -> EngineResult<Self> {
        let point = generate_crash_point(&setup, rng)?;
        Ok(Self::with_point(setup, point))
    }

    pub fn with_point(setup: CrashSetup, point: CrashPoint) -> Self {
        Self {
            setup,
            termination_tick: setup.termination_tick(point.multiplier),
            point,
            status: CrashStatus::Running,
        }
    }

    pub fn setup(&self) -> &CrashSetup {
        &self.setup
    }

    pub fn status(&self) -> CrashStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status != CrashStatus::Running
    }

    pub fn termination_tick(&self) -> u64 {
        self.termination_tick
    }

    /// Whether the round is still running at `tick`
    pub fn is_live_at(&self, tick: u64) -> bool {
        tick < self.termination_tick
    }

    /// Cash out at `tick`. Wins `m(tick)` iff `tick` is before the
    /// termination tick; a late request busts the round.
    pub fn cash_out(&mut self, tick: u64) -> EngineResult<Multiplier> {
        if self.is_finished() {
            return Err(ValidationError::ActionNotAllowed("round is already over".to_string()).into());
        }
        if self.is_live_at(tick) {
            let multiplier = self.setup.multiplier_at(tick);
            self.status = CrashStatus::CashedOut { tick, multiplier };
            Ok(multiplier)
        } else {
            self.status = CrashStatus::Busted;
            Ok(Multiplier::ZERO)
        }
    }

    /// Settle a round the player rode to the end
    pub fn bust(&mut self) -> EngineResult<()> {
        if self.is_finished() {
            return Err(ValidationError::ActionNotAllowed("round is already over".to_string()).into());
        }
        self.status = CrashStatus::Busted;
        Ok(())
    }

    pub fn final_multiplier(&self) -> Multiplier {
        match self.status {
            CrashStatus::CashedOut { multiplier, .. } => multiplier,
            _ => Multiplier::ZERO,
        }
    }

    pub fn detail(&self) -> ResultDetail {
        ResultDetail::Crash {
            crash_point: self.point.multiplier,
            instant_bust: self.point.instant_bust,
            cashed_out_at: match self.status {
                CrashStatus::CashedOut { multiplier, .. } => Some(multiplier),
                _ => None,
            },
        }
    }
}

/// One-shot crash with an automatic cash-out target
#[derive(Debug, Clone, PartialEq)]
pub struct CrashTicket {
    setup: CrashSetup,
    target: Multiplier,
}

impl CrashTicket {
    pub fn new(auto_cash_out: f64, rules: &GameRules) -> Result<Self, ValidationError> {
        let setup = CrashSetup::from_rules(rules);
        if !auto_cash_out.is_finite() || auto_cash_out < 1.01 || auto_cash_out > setup.max_multiplier {
            return Err(ValidationError::InvalidParameter {
                field: "auto_cash_out",
                reason: format!("must be between 1.01 and {}", setup.max_multiplier),
            });
        }
        Ok(Self {
            setup,
            target: Multiplier::floor_from_f64(auto_cash_out),
        })
    }

    pub fn play(&self, rng: &mut dyn RandomSource) -> EngineResult<(ResultDetail, Multiplier)> {
        let point = generate_crash_point(&self.setup, rng)?;
        Ok(self.settle(point))
    }

    /// Wins the target iff it is strictly below the crash point
    pub fn settle(&self, point: CrashPoint) -> (ResultDetail, Multiplier) {
        let won = self.target < point.multiplier;
        let detail = ResultDetail::Crash {
            crash_point: point.multiplier,
            instant_bust: point.instant_bust,
            cashed_out_at: won.then_some(self.target),
        };
        (detail, if won { self.target } else { Multiplier::ZERO })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::rng::{ScriptedDraws, StdDraws};

    fn setup() -> CrashSetup {
        CrashSetup::from_rules(&GameRules::new(&EngineConfig::default()).unwrap())
    }

    #[test]
    fn test_instant_bust() {
        let mut draws = ScriptedDraws::new([0.01]);
        let point = generate_crash_point(&setup(), &mut draws).unwrap();
        assert!(point.instant_bust);
        assert_eq!(point.multiplier, Multiplier::ONE);
        assert_eq!(draws.consumed(), 1);
    }

    #[test]
    fn test_instant_bust_loses_every_cash_out() {
        let mut round = CrashRound::with_point(
            setup(),
            CrashPoint {
                multiplier: Multiplier::ONE,
                instant_bust: true,
            },
        );
        assert_eq!(round.termination_tick(), 0);
        assert_eq!(round.cash_out(0).unwrap(), Multiplier::ZERO);
        assert_eq!(round.status(), CrashStatus::Busted);
    }

    #[test]
    fn test_crash_point_formula() {
        // r = 0.5, 1% edge: 100 / (0.5 * 99) = 2.0202..
        let mut draws = ScriptedDraws::new([0.5, 0.5]);
        let point = generate_crash_point(&setup(), &mut draws).unwrap();
        assert!(!point.instant_bust);
        assert_eq!(point.multiplier, Multiplier::from_hundredths(202));

        // r near 1 floors to 1.01 / 1.00 region but never below 1.00
        let mut draws = ScriptedDraws::new([0.5, 0.999_999]);
        let point = generate_crash_point(&setup(), &mut draws).unwrap();
        assert!(point.multiplier >= Multiplier::ONE);

        // r = 0 hits the cap
        let mut draws = ScriptedDraws::new([0.5, 0.0]);
        let point = generate_crash_point(&setup(), &mut draws).unwrap();
        assert_eq!(point.multiplier, Multiplier::from_whole(10_000));
    }

    #[test]
    fn test_path_is_monotone_and_terminates() {
        let setup = setup();
        let mut last = Multiplier::ZERO;
        for tick in 0..2_000 {
            let m = setup.multiplier_at(tick);
            assert!(m >= last);
            last = m;
        }
        assert_eq!(setup.multiplier_at(0), Multiplier::ONE);

        for hundredths in [101, 150, 202, 1_000, 123_456, 1_000_000] {
            let point = Multiplier::from_hundredths(hundredths);
            let tick = setup.termination_tick(point);
            assert!(setup.multiplier_at(tick) >= point);
            assert!(tick == 0 || setup.multiplier_at(tick - 1) < point);
        }
    }

    #[test]
    fn test_cash_out_before_and_after_termination() {
        let point = CrashPoint {
            multiplier: Multiplier::from_whole(2),
            instant_bust: false,
        };
        let setup = setup();
        let end = setup.termination_tick(point.multiplier);

        let mut early = CrashRound::with_point(setup, point);
        let won = early.cash_out(end - 1).unwrap();
        assert_eq!(won, setup.multiplier_at(end - 1));
        assert!(won < Multiplier::from_whole(2));
        assert!(early.cash_out(1).is_err());

        let mut late = CrashRound::with_point(setup, point);
        assert_eq!(late.cash_out(end).unwrap(), Multiplier::ZERO);
        assert_eq!(late.final_multiplier(), Multiplier::ZERO);
    }

    #[test]
    fn test_auto_cash_out_ties_go_to_house() {
        let rules = GameRules::new(&EngineConfig::default()).unwrap();
        let ticket = CrashTicket::new(2.0, &rules).unwrap();

        let tie = CrashPoint {
            multiplier: Multiplier::from_whole(2),
            instant_bust: false,
        };
        assert_eq!(ticket.settle(tie).1, Multiplier::ZERO);

        let above = CrashPoint {
            multiplier: Multiplier::from_hundredths(201),
            instant_bust: false,
        };
        assert_eq!(ticket.settle(above).1, Multiplier::from_whole(2));

        assert!(CrashTicket::new(1.0, &rules).is_err());
        assert!(CrashTicket::new(20_000.0, &rules).is_err());
    }

    #[test]
    fn test_long_run_return_is_below_one() {
        let rules = GameRules::new(&EngineConfig::default()).unwrap();
        let ticket = CrashTicket::new(2.0, &rules).unwrap();
        let mut rng = StdDraws::seeded(99);
        let rounds = 200_000;
        let mut returned = 0u64;
        for _ in 0..rounds {
            returned += ticket.play(&mut rng).unwrap().1.hundredths();
        }
        let rtp = returned as f64 / (rounds as f64 * 100.0);
        assert!(rtp < 1.0 && rtp > 0.9, "crash returned {}", rtp);
    }
}

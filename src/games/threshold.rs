//! Threshold-probability games: dice and limbo
//!
//! The multiplier is fixed from the win chance before anything is drawn:
//! `m = max(1.01, floor2(100 * (1 - edge) / p))` with `p` in percent.

use crate::common::types::Multiplier;
use crate::errors::{EngineResult, ValidationError};
use crate::games::rules::GameRules;
use crate::games::types::{DiceDirection, ResultDetail};
use crate::rng::RandomSource;

const MIN_THRESHOLD_MULTIPLIER: Multiplier = Multiplier::from_hundredths(101);

/// Payout multiplier for a win chance `p` (percent) under `edge`
pub fn threshold_multiplier(win_chance: f64, edge: f64) -> Multiplier {
    Multiplier::floor_from_f64(100.0 * (1.0 - edge) / win_chance).max(MIN_THRESHOLD_MULTIPLIER)
}

/// Validated dice bet
#[derive(Debug, Clone, PartialEq)]
pub struct DiceBet {
    target: f64,
    direction: DiceDirection,
    win_chance: f64,
    multiplier: Multiplier,
}

impl DiceBet {
    pub fn new(target: f64, direction: DiceDirection, rules: &GameRules) -> Result<Self, ValidationError> {
        if !target.is_finite() || target <= 0.0 || target >= 100.0 {
            return Err(ValidationError::InvalidParameter {
                field: "target",
                reason: format!("{} is outside (0, 100)", target),
            });
        }

        let win_chance = match direction {
            DiceDirection::Over => 100.0 - target,
            DiceDirection::Under => target,
        };

        let bounds = &rules.config().dice;
        if win_chance < bounds.min_win_chance || win_chance > bounds.max_win_chance {
            return Err(ValidationError::InvalidParameter {
                field: "target",
                reason: format!(
                    "win chance {:.2}% must be between {}% and {}%",
                    win_chance, bounds.min_win_chance, bounds.max_win_chance
                ),
            });
        }

        Ok(Self {
            target,
            direction,
            win_chance,
            multiplier: threshold_multiplier(win_chance, rules.config().house_edge.dice),
        })
    }

    pub fn win_chance(&self) -> f64 {
        self.win_chance
    }

    pub fn multiplier(&self) -> Multiplier {
        self.multiplier
    }

    /// Roll `r * 100` and compare strictly against the target
    pub fn roll(&self, rng: &mut dyn RandomSource) -> EngineResult<(ResultDetail, Multiplier)> {
        let roll = rng.next_unit()? * 100.0;
        let won = match self.direction {
            DiceDirection::Over => roll > self.target,
            DiceDirection::Under => roll < self.target,
        };

        let detail = ResultDetail::Dice {
            roll,
            target: self.target,
            direction: self.direction,
            win_chance: self.win_chance,
        };
        Ok((detail, if won { self.multiplier } else { Multiplier::ZERO }))
    }
}

/// Validated limbo bet
#[derive(Debug, Clone, PartialEq)]
pub struct LimboBet {
    target: Multiplier,
    edge: f64,
    max_result: Multiplier,
}

impl LimboBet {
    pub fn new(target: f64, rules: &GameRules) -> Result<Self, ValidationError> {
        let bounds = &rules.config().limbo;
        if !target.is_finite() || target < bounds.min_target || target > bounds.max_target {
            return Err(ValidationError::InvalidParameter {
                field: "target",
                reason: format!("{} must be between {} and {}", target, bounds.min_target, bounds.max_target),
            });
        }

        Ok(Self {
            target: Multiplier::floor_from_f64(target),
            edge: rules.config().house_edge.limbo,
            max_result: Multiplier::floor_from_f64(bounds.max_target),
        })
    }

    pub fn target(&self) -> Multiplier {
        self.target
    }

    /// Win chance in percent, `100 * (1 - edge) / T`
    pub fn win_chance(&self) -> f64 {
        100.0 * (1.0 - self.edge) / self.target.as_f64()
    }

    /// Win iff `r < p / 100`; the shown result is `(1 - edge) / r`, floored
    pub fn play(&self, rng: &mut dyn RandomSource) -> EngineResult<(ResultDetail, Multiplier)> {
        let r = rng.next_unit()?;
        let won = r < self.win_chance() / 100.0;

        let shown = if r > 0.0 {
            Multiplier::floor_from_f64((1.0 - self.edge) / r).min(self.max_result)
        } else {
            self.max_result
        };
        // Keep the displayed value on the correct side of the target
        let shown = if won { shown.max(self.target) } else { shown.min(self.target) };

        let detail = ResultDetail::Limbo {
            result: shown,
            target: self.target,
        };
        Ok((detail, if won { self.target } else { Multiplier::ZERO }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::rng::ScriptedDraws;

    fn rules() -> GameRules {
        GameRules::new(&EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_dice_even_chance() {
        let bet = DiceBet::new(50.0, DiceDirection::Over, &rules()).unwrap();
        assert_eq!(bet.win_chance(), 50.0);
        assert_eq!(bet.multiplier(), Multiplier::from_hundredths(198));
    }

    #[test]
    fn test_dice_house_keeps_edge_for_all_targets() {
        let rules = rules();
        for step in 1..10_000 {
            let target = step as f64 / 100.0;
            for direction in [DiceDirection::Over, DiceDirection::Under] {
                if let Ok(bet) = DiceBet::new(target, direction, &rules) {
                    assert!(
                        bet.multiplier().as_f64() * bet.win_chance() <= 100.0 + 1e-9,
                        "target {} {:?}",
                        target,
                        direction
                    );
                    assert!(bet.multiplier() >= MIN_THRESHOLD_MULTIPLIER);
                }
            }
        }
    }

    #[test]
    fn test_dice_rejects_out_of_range_targets() {
        let rules = rules();
        assert!(DiceBet::new(0.0, DiceDirection::Under, &rules).is_err());
        assert!(DiceBet::new(100.0, DiceDirection::Over, &rules).is_err());
        assert!(DiceBet::new(f64::NAN, DiceDirection::Over, &rules).is_err());
        // 99% win chance is above the default cap of 98%
        assert!(DiceBet::new(1.0, DiceDirection::Over, &rules).is_err());
        assert!(DiceBet::new(2.0, DiceDirection::Over, &rules).is_ok());
    }

    #[test]
    fn test_dice_roll_is_strict() {
        let bet = DiceBet::new(50.0, DiceDirection::Over, &rules()).unwrap();
        let mut draws = ScriptedDraws::new([0.5, 0.5001, 0.1]);
        assert_eq!(bet.roll(&mut draws).unwrap().1, Multiplier::ZERO);
        assert_eq!(bet.roll(&mut draws).unwrap().1, Multiplier::from_hundredths(198));
        assert_eq!(bet.roll(&mut draws).unwrap().1, Multiplier::ZERO);

        let under = DiceBet::new(50.0, DiceDirection::Under, &rules()).unwrap();
        let mut draws = ScriptedDraws::new([0.4999]);
        assert_eq!(under.roll(&mut draws).unwrap().1, Multiplier::from_hundredths(198));
    }

    #[test]
    fn test_limbo_win_and_loss() {
        let bet = LimboBet::new(2.0, &rules()).unwrap();
        assert!((bet.win_chance() - 49.5).abs() < 1e-9);

        let mut draws = ScriptedDraws::new([0.3, 0.6]);
        let (detail, multiplier) = bet.play(&mut draws).unwrap();
        assert_eq!(multiplier, Multiplier::from_whole(2));
        match detail {
            ResultDetail::Limbo { result, .. } => assert_eq!(result, Multiplier::from_hundredths(330)),
            other => panic!("unexpected detail {:?}", other),
        }

        let (detail, multiplier) = bet.play(&mut draws).unwrap();
        assert_eq!(multiplier, Multiplier::ZERO);
        match detail {
            ResultDetail::Limbo { result, .. } => assert_eq!(result, Multiplier::from_hundredths(165)),
            other => panic!("unexpected detail {:?}", other),
        }
    }

    #[test]
    fn test_limbo_rejects_low_target() {
        assert!(LimboBet::new(1.0, &rules()).is_err());
        assert!(LimboBet::new(f64::INFINITY, &rules()).is_err());
    }
}

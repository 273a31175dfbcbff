//! Three-reel slots over a weighted symbol alphabet

use crate::common::types::Multiplier;
use crate::errors::EngineResult;
use crate::games::types::{ResultDetail, SlotSymbol};
use crate::games::weighted::WeightedTable;
use crate::rng::RandomSource;

const REEL_WEIGHTS: [(SlotSymbol, f64); 6] = [
    (SlotSymbol::Cherry, 0.30),
    (SlotSymbol::Lemon, 0.25),
    (SlotSymbol::Orange, 0.20),
    (SlotSymbol::Bell, 0.12),
    (SlotSymbol::Bar, 0.08),
    (SlotSymbol::Seven, 0.05),
];

pub fn build_reel() -> EngineResult<WeightedTable<SlotSymbol>> {
    WeightedTable::new("slots/reel", REEL_WEIGHTS.to_vec())
}

/// Exact ordered lookup of the payline; anything not listed pays nothing
pub fn payline(reels: &[SlotSymbol; 3]) -> Multiplier {
    use SlotSymbol::*;
    let whole = match reels {
        [Cherry, Cherry, Cherry] => 10,
        [Lemon, Lemon, Lemon] => 15,
        [Orange, Orange, Orange] => 20,
        [Bell, Bell, Bell] => 40,
        [Bar, Bar, Bar] => 80,
        [Seven, Seven, Seven] => 250,
        [Seven, Seven, Bar] | [Bar, Bar, Seven] => 25,
        _ => 0,
    };
    Multiplier::from_whole(whole)
}

pub fn spin(reel: &WeightedTable<SlotSymbol>, rng: &mut dyn RandomSource) -> EngineResult<(ResultDetail, Multiplier)> {
    let reels = [
        *reel.sample(rng)?.1,
        *reel.sample(rng)?.1,
        *reel.sample(rng)?.1,
    ];
    let multiplier = payline(&reels);
    Ok((ResultDetail::Slots { reels }, multiplier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedDraws;

    #[test]
    fn test_payline_is_ordered() {
        use SlotSymbol::*;
        assert_eq!(payline(&[Seven, Seven, Seven]), Multiplier::from_whole(250));
        assert_eq!(payline(&[Seven, Seven, Bar]), Multiplier::from_whole(25));
        assert_eq!(payline(&[Bar, Seven, Seven]), Multiplier::ZERO);
        assert_eq!(payline(&[Cherry, Lemon, Cherry]), Multiplier::ZERO);
    }

    #[test]
    fn test_expected_return_below_one() {
        let reel = build_reel().unwrap();
        let symbols = reel.outcomes().to_vec();
        let mut expected = 0.0;
        for (a, _) in symbols.iter().enumerate() {
            for (b, _) in symbols.iter().enumerate() {
                for (c, _) in symbols.iter().enumerate() {
                    let p = reel.weight(a) * reel.weight(b) * reel.weight(c);
                    expected += p * payline(&[symbols[a], symbols[b], symbols[c]]).as_f64();
                }
            }
        }
        assert!(expected < 1.0 && expected > 0.5, "slots return {}", expected);
    }

    #[test]
    fn test_spin_uses_one_draw_per_reel() {
        let reel = build_reel().unwrap();
        let mut draws = ScriptedDraws::new([0.99, 0.99, 0.99]);
        let (detail, multiplier) = spin(&reel, &mut draws).unwrap();
        assert_eq!(detail, ResultDetail::Slots { reels: [SlotSymbol::Seven; 3] });
        assert_eq!(multiplier, Multiplier::from_whole(250));
        assert_eq!(draws.consumed(), 3);
    }
}

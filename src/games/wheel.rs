//! Wheel: fixed segment layouts per risk level, uniform over segments

use crate::common::types::Multiplier;
use crate::errors::EngineResult;
use crate::games::types::{ResultDetail, RiskLevel};
use crate::games::weighted::WeightedTable;
use crate::rng::RandomSource;

/// Segment multipliers in hundredths, clockwise from the top
pub fn layout(risk: RiskLevel) -> &'static [u64] {
    match risk {
        RiskLevel::Low => &[150, 120, 120, 120, 0, 120, 120, 120, 120, 0],
        RiskLevel::Medium => &[0, 190, 0, 150, 0, 200, 0, 150, 0, 300],
        RiskLevel::High => &[0, 0, 0, 0, 0, 0, 0, 0, 0, 990],
    }
}

pub fn build_table(risk: RiskLevel) -> EngineResult<WeightedTable<Multiplier>> {
    let segments = layout(risk).iter().map(|&h| Multiplier::from_hundredths(h)).collect();
    WeightedTable::uniform(format!("wheel/{:?}", risk).to_lowercase(), segments)
}

pub fn spin(
    risk: RiskLevel,
    table: &WeightedTable<Multiplier>,
    rng: &mut dyn RandomSource,
) -> EngineResult<(ResultDetail, Multiplier)> {
    let (segment, &multiplier) = table.sample(rng)?;
    let detail = ResultDetail::Wheel {
        risk,
        segment,
        segment_multiplier: multiplier,
    };
    Ok((detail, multiplier))
}

//! Score-to-payout arcade variants
//!
//! The score is reported by the caller once the mini-game ends; no random
//! draw is taken here.

use crate::common::types::Multiplier;
use crate::errors::ValidationError;
use crate::games::types::{ArcadeVariant, ResultDetail};

/// `(minimum score, multiplier in hundredths)`, highest tier first
fn tiers(variant: ArcadeVariant) -> &'static [(u32, u64)] {
    match variant {
        ArcadeVariant::Reflex => &[(950, 500), (850, 250), (700, 150), (500, 100)],
        ArcadeVariant::Memory => &[(18, 1000), (14, 400), (10, 200), (7, 120), (5, 100)],
        ArcadeVariant::Aim => &[(48, 800), (42, 300), (35, 180), (25, 110), (20, 100)],
    }
}

pub fn max_score(variant: ArcadeVariant) -> u32 {
    match variant {
        ArcadeVariant::Reflex => 1000,
        ArcadeVariant::Memory => 20,
        ArcadeVariant::Aim => 50,
    }
}

pub fn validate_score(variant: ArcadeVariant, score: u32) -> Result<(), ValidationError> {
    if score > max_score(variant) {
        return Err(ValidationError::InvalidParameter {
            field: "score",
            reason: format!("{} exceeds the {:?} maximum of {}", score, variant, max_score(variant)),
        });
    }
    Ok(())
}

pub fn score_multiplier(variant: ArcadeVariant, score: u32) -> Multiplier {
    tiers(variant)
        .iter()
        .find(|(min_score, _)| score >= *min_score)
        .map(|&(_, hundredths)| Multiplier::from_hundredths(hundredths))
        .unwrap_or(Multiplier::ZERO)
}

pub fn settle(variant: ArcadeVariant, score: u32) -> (ResultDetail, Multiplier) {
    (ResultDetail::Arcade { variant, score }, score_multiplier(variant, score))
}

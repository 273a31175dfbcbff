//! European roulette: 37 pockets, uniform

use crate::common::types::Multiplier;
use crate::errors::{EngineResult, ValidationError};
use crate::games::types::{PocketColor, ResultDetail, RouletteBet};
use crate::rng::RandomSource;

pub const POCKETS: u32 = 37;

const RED_NUMBERS: [u8; 18] = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];

const STRAIGHT_MULTIPLIER: Multiplier = Multiplier::from_whole(35);
const EVEN_MONEY_MULTIPLIER: Multiplier = Multiplier::from_whole(2);
const DOZEN_MULTIPLIER: Multiplier = Multiplier::from_whole(3);

pub fn pocket_color(pocket: u8) -> PocketColor {
    if pocket == 0 {
        PocketColor::Green
    } else if RED_NUMBERS.contains(&pocket) {
        PocketColor::Red
    } else {
        PocketColor::Black
    }
}

pub fn validate_bet(bet: &RouletteBet) -> Result<(), ValidationError> {
    match *bet {
        RouletteBet::Straight(n) if n > 36 => Err(ValidationError::InvalidParameter {
            field: "bet",
            reason: format!("straight number {} is not on the wheel", n),
        }),
        RouletteBet::Dozen(d) | RouletteBet::Column(d) if !(1..=3).contains(&d) => {
            Err(ValidationError::InvalidParameter {
                field: "bet",
                reason: format!("dozen/column {} must be 1, 2 or 3", d),
            })
        }
        _ => Ok(()),
    }
}

/// Multiplier `bet` pays when the ball lands in `pocket`
pub fn payout_multiplier(bet: &RouletteBet, pocket: u8) -> Multiplier {
    let won = match *bet {
        RouletteBet::Straight(n) => pocket == n,
        // Zero loses every outside bet
        _ if pocket == 0 => false,
        RouletteBet::Red => pocket_color(pocket) == PocketColor::Red,
        RouletteBet::Black => pocket_color(pocket) == PocketColor::Black,
        RouletteBet::Even => pocket % 2 == 0,
        RouletteBet::Odd => pocket % 2 == 1,
        RouletteBet::Low => pocket <= 18,
        RouletteBet::High => pocket >= 19,
        RouletteBet::Dozen(d) => (pocket - 1) / 12 + 1 == d,
        RouletteBet::Column(c) => (pocket - 1) % 3 + 1 == c,
    };

    match (won, bet) {
        (false, _) => Multiplier::ZERO,
        (true, RouletteBet::Straight(_)) => STRAIGHT_MULTIPLIER,
        (true, RouletteBet::Dozen(_) | RouletteBet::Column(_)) => DOZEN_MULTIPLIER,
        (true, _) => EVEN_MONEY_MULTIPLIER,
    }
}

pub fn spin(bet: RouletteBet, rng: &mut dyn RandomSource) -> EngineResult<(ResultDetail, Multiplier)> {
    let pocket = rng.next_below(POCKETS)? as u8;
    let detail = ResultDetail::Roulette {
        pocket,
        color: pocket_color(pocket),
        bet,
    };
    Ok((detail, payout_multiplier(&bet, pocket)))
}

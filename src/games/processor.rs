use crate::common::types::Multiplier;
use crate::errors::{EngineResult, InvariantViolation, ValidationError};
use crate::games::blackjack::BlackjackStrategy;
use crate::games::crash::CrashTicket;
use crate::games::keno::KenoTicket;
use crate::games::mines::MinesTicket;
use crate::games::rules::GameRules;
use crate::games::threshold::{DiceBet, LimboBet};
use crate::games::types::{
    ArcadeVariant, GameParams, GameType, ResultDetail, RiskLevel, RouletteBet, WagerOutcome, WagerRequest,
};
use crate::games::{arcade, plinko, roulette, slots, wheel};
use crate::rng::RandomSource;
use std::sync::Arc;

/// A request whose parameters passed validation. Nothing has been drawn yet.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedGame {
    Dice(DiceBet),
    Limbo(LimboBet),
    Roulette(RouletteBet),
    Wheel(RiskLevel),
    Keno(KenoTicket),
    Slots,
    Arcade { variant: ArcadeVariant, score: u32 },
    Mines(MinesTicket),
    Crash(CrashTicket),
    Plinko { rows: u32, risk: RiskLevel },
    Blackjack(BlackjackStrategy),
}

impl PreparedGame {
    /// Validate parameters against the rules without touching any randomness
    pub fn prepare(params: &GameParams, rules: &GameRules) -> Result<Self, ValidationError> {
        Ok(match params {
            GameParams::Dice { target, direction } => PreparedGame::Dice(DiceBet::new(*target, *direction, rules)?),
            GameParams::Limbo { target } => PreparedGame::Limbo(LimboBet::new(*target, rules)?),
            GameParams::Roulette { bet } => {
                roulette::validate_bet(bet)?;
                PreparedGame::Roulette(*bet)
            }
            GameParams::Wheel { risk } => PreparedGame::Wheel(*risk),
            GameParams::Keno { picks } => PreparedGame::Keno(KenoTicket::new(picks, &rules.config().keno)?),
            GameParams::Slots => PreparedGame::Slots,
            GameParams::Arcade { variant, score } => {
                arcade::validate_score(*variant, *score)?;
                PreparedGame::Arcade {
                    variant: *variant,
                    score: *score,
                }
            }
            GameParams::Mines { mines, reveals } => PreparedGame::Mines(MinesTicket::new(*mines, reveals, rules)?),
            GameParams::Crash { auto_cash_out } => PreparedGame::Crash(CrashTicket::new(*auto_cash_out, rules)?),
            GameParams::Plinko { rows, risk } => {
                plinko::validate_rows(*rows)?;
                PreparedGame::Plinko {
                    rows: *rows,
                    risk: *risk,
                }
            }
            GameParams::Blackjack { stand_on } => PreparedGame::Blackjack(BlackjackStrategy::new(*stand_on)?),
        })
    }

    pub fn game_type(&self) -> GameType {
        match self {
            PreparedGame::Dice(_) => GameType::Dice,
            PreparedGame::Limbo(_) => GameType::Limbo,
            PreparedGame::Roulette(_) => GameType::Roulette,
            PreparedGame::Wheel(_) => GameType::Wheel,
            PreparedGame::Keno(_) => GameType::Keno,
            PreparedGame::Slots => GameType::Slots,
            PreparedGame::Arcade { .. } => GameType::Arcade,
            PreparedGame::Mines(_) => GameType::Mines,
            PreparedGame::Crash(_) => GameType::Crash,
            PreparedGame::Plinko { .. } => GameType::Plinko,
            PreparedGame::Blackjack(_) => GameType::Blackjack,
        }
    }

    /// Run the generator for this game
    pub fn run(&self, rules: &GameRules, rng: &mut dyn RandomSource) -> EngineResult<(ResultDetail, Multiplier)> {
        match self {
            PreparedGame::Dice(bet) => bet.roll(rng),
            PreparedGame::Limbo(bet) => bet.play(rng),
            PreparedGame::Roulette(bet) => roulette::spin(*bet, rng),
            PreparedGame::Wheel(risk) => {
                let table = rules
                    .wheel_table(*risk)
                    .ok_or_else(|| InvariantViolation::DrawOutOfRange(format!("no wheel table for {:?}", risk)))?;
                wheel::spin(*risk, table, rng)
            }
            PreparedGame::Keno(ticket) => ticket.draw(rules.keno(), rng),
            PreparedGame::Slots => slots::spin(rules.slot_reel(), rng),
            PreparedGame::Arcade { variant, score } => Ok(arcade::settle(*variant, *score)),
            PreparedGame::Mines(ticket) => ticket.play(rng),
            PreparedGame::Crash(ticket) => ticket.play(rng),
            PreparedGame::Plinko { rows, risk } => plinko::drop_ball(*rows, *risk, rules.plinko(), rng),
            PreparedGame::Blackjack(strategy) => strategy.play(rng),
        }
    }
}

/// Validate the bet and parameters, then draw and price the outcome.
///
/// Validation happens before the first draw, so a rejected request
/// consumes no entropy.
pub fn resolve(request: &WagerRequest, rules: &GameRules, rng: &mut dyn RandomSource) -> EngineResult<WagerOutcome> {
    rules.check_bet(request.bet_amount)?;
    let game = PreparedGame::prepare(&request.params, rules)?;
    price(request, &game, rules, rng)
}

/// Run an already validated game and compute the payout
pub fn price(
    request: &WagerRequest,
    game: &PreparedGame,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
) -> EngineResult<WagerOutcome> {
    let (detail, multiplier) = game.run(rules, rng)?;
    let payout = request
        .bet_amount
        .times(multiplier)
        .ok_or(InvariantViolation::Overflow("payout"))?;

    Ok(WagerOutcome {
        game_type: game.game_type(),
        detail,
        multiplier,
        payout,
    })
}

/// Resolves requests against a shared rule set
#[derive(Clone)]
pub struct GameProcessor {
    rules: Arc<GameRules>,
}

impl GameProcessor {
    pub fn new(rules: Arc<GameRules>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Validate without drawing
    pub fn prepare(&self, request: &WagerRequest) -> Result<PreparedGame, ValidationError> {
        self.rules.check_bet(request.bet_amount)?;
        PreparedGame::prepare(&request.params, &self.rules)
    }

    pub fn resolve(&self, request: &WagerRequest, rng: &mut dyn RandomSource) -> EngineResult<WagerOutcome> {
        resolve(request, &self.rules, rng)
    }

    pub fn price(
        &self,
        request: &WagerRequest,
        game: &PreparedGame,
        rng: &mut dyn RandomSource,
    ) -> EngineResult<WagerOutcome> {
        price(request, game, &self.rules, rng)
    }
}

use crate::common::types::{Money, Multiplier, SubjectId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Dice,
    Limbo,
    Roulette,
    Wheel,
    Keno,
    Slots,
    Arcade,
    Mines,
    Crash,
    Plinko,
    Blackjack,
}

impl GameType {
    pub const ALL: [GameType; 11] = [
        GameType::Dice,
        GameType::Limbo,
        GameType::Roulette,
        GameType::Wheel,
        GameType::Keno,
        GameType::Slots,
        GameType::Arcade,
        GameType::Mines,
        GameType::Crash,
        GameType::Plinko,
        GameType::Blackjack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Dice => "dice",
            GameType::Limbo => "limbo",
            GameType::Roulette => "roulette",
            GameType::Wheel => "wheel",
            GameType::Keno => "keno",
            GameType::Slots => "slots",
            GameType::Arcade => "arcade",
            GameType::Mines => "mines",
            GameType::Crash => "crash",
            GameType::Plinko => "plinko",
            GameType::Blackjack => "blackjack",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameType::ALL
            .iter()
            .copied()
            .find(|game| game.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown game '{}'", s))
    }
}

/// Win, loss or push, judged by the multiplier against 1.00x
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Loss,
    Push,
}

impl GameOutcome {
    pub fn from_multiplier(multiplier: Multiplier) -> Self {
        match multiplier.cmp(&Multiplier::ONE) {
            std::cmp::Ordering::Greater => GameOutcome::Win,
            std::cmp::Ordering::Equal => GameOutcome::Push,
            std::cmp::Ordering::Less => GameOutcome::Loss,
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Win => write!(f, "win"),
            GameOutcome::Loss => write!(f, "loss"),
            GameOutcome::Push => write!(f, "push"),
        }
    }
}

/// Dice roll direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiceDirection {
    Over,
    Under,
}

/// Risk profile shared by wheel and plinko tables
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level '{}'", other)),
        }
    }
}

/// European roulette bet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum RouletteBet {
    Straight(u8),
    Red,
    Black,
    Even,
    Odd,
    Low,
    High,
    /// 1 = 1-12, 2 = 13-24, 3 = 25-36
    Dozen(u8),
    /// 1 = 1,4,7..; 2 = 2,5,8..; 3 = 3,6,9..
    Column(u8),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PocketColor {
    Green,
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SlotSymbol {
    Cherry,
    Lemon,
    Orange,
    Bell,
    Bar,
    Seven,
}

/// Score-to-payout arcade games
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArcadeVariant {
    /// Reaction test, score 0-1000
    Reflex,
    /// Sequence recall, score = levels cleared (0-20)
    Memory,
    /// Target shooting, score = hits out of 50
    Aim,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

/// Playing card; `rank` is 1 (ace) through 13 (king)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: u8,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: u8, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Position in a fresh deck, 0..52
    pub fn index(&self) -> u32 {
        let suit = match self.suit {
            Suit::Spades => 0,
            Suit::Hearts => 1,
            Suit::Diamonds => 2,
            Suit::Clubs => 3,
        };
        suit * 13 + (self.rank as u32 - 1)
    }

    /// Hard value: ace counts 1, face cards 10
    pub fn hard_value(&self) -> u32 {
        match self.rank {
            1 => 1,
            r if r >= 10 => 10,
            r => r as u32,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = match self.rank {
            1 => "A".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            r => r.to_string(),
        };
        let suit = match self.suit {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        };
        write!(f, "{}{}", rank, suit)
    }
}

/// How a blackjack hand was decided
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HandOutcome {
    PlayerBust,
    PlayerBlackjack,
    DealerBust,
    PlayerHigher,
    Push,
    DealerHigher,
}

/// Game parameters for a one-shot round. Validated before any draw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum GameParams {
    Dice { target: f64, direction: DiceDirection },
    Limbo { target: f64 },
    Roulette { bet: RouletteBet },
    Wheel { risk: RiskLevel },
    /// Picked numbers, 1-based
    Keno { picks: Vec<u32> },
    Slots,
    Arcade { variant: ArcadeVariant, score: u32 },
    /// Cells revealed in order, then cashed out
    Mines { mines: u32, reveals: Vec<u32> },
    /// Automatic cash-out target
    Crash { auto_cash_out: f64 },
    Plinko { rows: u32, risk: RiskLevel },
    /// Fixed strategy: hit while the player total is below `stand_on`
    Blackjack { stand_on: u32 },
}

impl GameParams {
    pub fn game_type(&self) -> GameType {
        match self {
            GameParams::Dice { .. } => GameType::Dice,
            GameParams::Limbo { .. } => GameType::Limbo,
            GameParams::Roulette { .. } => GameType::Roulette,
            GameParams::Wheel { .. } => GameType::Wheel,
            GameParams::Keno { .. } => GameType::Keno,
            GameParams::Slots => GameType::Slots,
            GameParams::Arcade { .. } => GameType::Arcade,
            GameParams::Mines { .. } => GameType::Mines,
            GameParams::Crash { .. } => GameType::Crash,
            GameParams::Plinko { .. } => GameType::Plinko,
            GameParams::Blackjack { .. } => GameType::Blackjack,
        }
    }
}

/// Immutable request to resolve one round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WagerRequest {
    pub subject: SubjectId,
    pub bet_amount: Money,
    pub params: GameParams,
}

impl WagerRequest {
    pub fn new(subject: SubjectId, bet_amount: Money, params: GameParams) -> Self {
        Self {
            subject,
            bet_amount,
            params,
        }
    }

    pub fn game_type(&self) -> GameType {
        self.params.game_type()
    }
}

/// Game-specific result descriptor (discriminated union)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum ResultDetail {
    Dice {
        roll: f64,
        target: f64,
        direction: DiceDirection,
        win_chance: f64,
    },
    Limbo {
        result: Multiplier,
        target: Multiplier,
    },
    Roulette {
        pocket: u8,
        color: PocketColor,
        bet: RouletteBet,
    },
    Wheel {
        risk: RiskLevel,
        segment: usize,
        segment_multiplier: Multiplier,
    },
    Keno {
        picks: Vec<u32>,
        drawn: Vec<u32>,
        matches: u32,
    },
    Slots {
        reels: [SlotSymbol; 3],
    },
    Arcade {
        variant: ArcadeVariant,
        score: u32,
    },
    Mines {
        grid_size: u32,
        mine_positions: Vec<u32>,
        revealed: Vec<u32>,
        hit_mine: Option<u32>,
    },
    Crash {
        crash_point: Multiplier,
        instant_bust: bool,
        /// Multiplier the player cashed out at, if they did in time
        cashed_out_at: Option<Multiplier>,
    },
    Plinko {
        rows: u32,
        risk: RiskLevel,
        /// `true` for each step to the right
        path: Vec<bool>,
        bucket: u32,
    },
    Blackjack {
        player: Vec<Card>,
        dealer: Vec<Card>,
        player_total: u32,
        dealer_total: u32,
        outcome: HandOutcome,
    },
}

/// Result of one resolved round. Produced once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WagerOutcome {
    pub game_type: GameType,
    pub detail: ResultDetail,
    pub multiplier: Multiplier,
    pub payout: Money,
}

impl WagerOutcome {
    pub fn result(&self) -> GameOutcome {
        GameOutcome::from_multiplier(self.multiplier)
    }

    pub fn is_loss(&self) -> bool {
        self.multiplier.is_zero()
    }
}

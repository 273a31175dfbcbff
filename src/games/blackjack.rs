//! Blackjack against a dealer who draws to 17
//!
//! Every round shuffles a fresh 52-card deck. Deal order is player, dealer,
//! player, dealer; a player natural pays 2.5x before the dealer plays.

use crate::common::types::Multiplier;
use crate::errors::{EngineResult, InvariantViolation, ValidationError};
use crate::games::types::{Card, HandOutcome, ResultDetail, Suit};
use crate::rng::{ensure_distinct, shuffle, RandomSource};
use serde::{Deserialize, Serialize};

const DEALER_STANDS_ON: u32 = 17;
const BLACKJACK: u32 = 21;

pub fn fresh_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(52);
    for suit in [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs] {
        for rank in 1..=13 {
            cards.push(Card::new(rank, suit));
        }
    }
    cards
}

/// Hand total with aces counted as 11 where that does not bust
pub fn hand_value(cards: &[Card]) -> u32 {
    let hard: u32 = cards.iter().map(Card::hard_value).sum();
    let has_ace = cards.iter().any(|c| c.rank == 1);
    if has_ace && hard + 10 <= BLACKJACK {
        hard + 10
    } else {
        hard
    }
}

pub fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_value(cards) == BLACKJACK
}

/// Final decision for a player hand against a dealer hand
pub fn settle_hands(player: &[Card], dealer: &[Card]) -> (HandOutcome, Multiplier) {
    let player_total = hand_value(player);
    let dealer_total = hand_value(dealer);

    if player_total > BLACKJACK {
        (HandOutcome::PlayerBust, Multiplier::ZERO)
    } else if is_natural(player) {
        (HandOutcome::PlayerBlackjack, Multiplier::from_hundredths(250))
    } else if dealer_total > BLACKJACK {
        (HandOutcome::DealerBust, Multiplier::from_whole(2))
    } else if player_total > dealer_total {
        (HandOutcome::PlayerHigher, Multiplier::from_whole(2))
    } else if player_total == dealer_total {
        (HandOutcome::Push, Multiplier::ONE)
    } else {
        (HandOutcome::DealerHigher, Multiplier::ZERO)
    }
}

/// Cards dealt front to back, never reused
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Deck {
    pub fn shuffled(rng: &mut dyn RandomSource) -> EngineResult<Self> {
        let mut cards = fresh_deck();
        shuffle(rng, &mut cards)?;
        Self::stacked(cards)
    }

    /// Deck in a known order
    pub fn stacked(cards: Vec<Card>) -> EngineResult<Self> {
        let indices: Vec<u32> = cards.iter().map(Card::index).collect();
        ensure_distinct(&indices, "blackjack deck")?;
        if cards.iter().any(|c| !(1..=13).contains(&c.rank)) {
            return Err(InvariantViolation::DrawOutOfRange("card rank".to_string()).into());
        }
        Ok(Self { cards, next: 0 })
    }

    pub fn draw(&mut self) -> EngineResult<Card> {
        let card = self
            .cards
            .get(self.next)
            .copied()
            .ok_or(InvariantViolation::DeckExhausted(self.next))?;
        self.next += 1;
        Ok(card)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlackjackStatus {
    PlayerTurn,
    Finished,
}

/// Interactive blackjack round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlackjackRound {
    deck: Deck,
    player: Vec<Card>,
    dealer: Vec<Card>,
    status: BlackjackStatus,
    result: Option<(HandOutcome, Multiplier)>,
}

impl BlackjackRound {
    pub fn deal(rng: &mut dyn RandomSource) -> EngineResult<Self> {
        Self::deal_from(Deck::shuffled(rng)?)
    }

    /// Deal player, dealer, player, dealer. A natural settles at once.
    pub fn deal_from(mut deck: Deck) -> EngineResult<Self> {
        let p1 = deck.draw()?;
        let d1 = deck.draw()?;
        let p2 = deck.draw()?;
        let d2 = deck.draw()?;

        let mut round = Self {
            deck,
            player: vec![p1, p2],
            dealer: vec![d1, d2],
            status: BlackjackStatus::PlayerTurn,
            result: None,
        };
        if is_natural(&round.player) {
            round.finish();
        }
        Ok(round)
    }

    pub fn player_cards(&self) -> &[Card] {
        &self.player
    }

    pub fn dealer_cards(&self) -> &[Card] {
        &self.dealer
    }

    /// The dealer card visible during the player's turn
    pub fn dealer_up_card(&self) -> Option<Card> {
        self.dealer.first().copied()
    }

    pub fn player_total(&self) -> u32 {
        hand_value(&self.player)
    }

    pub fn is_finished(&self) -> bool {
        self.status == BlackjackStatus::Finished
    }

    /// Draw a card; allowed while the player total is below 21
    pub fn hit(&mut self) -> EngineResult<Card> {
        self.ensure_player_turn()?;
        if self.player_total() >= BLACKJACK {
            return Err(ValidationError::ActionNotAllowed("cannot hit on 21".to_string()).into());
        }

        let card = self.deck.draw()?;
        self.player.push(card);

        let total = self.player_total();
        if total > BLACKJACK {
            self.finish();
        } else if total == BLACKJACK {
            self.stand()?;
        }
        Ok(card)
    }

    /// End the player's turn and play out the dealer
    pub fn stand(&mut self) -> EngineResult<()> {
        self.ensure_player_turn()?;
        while hand_value(&self.dealer) < DEALER_STANDS_ON {
            let card = self.deck.draw()?;
            self.dealer.push(card);
        }
        self.finish();
        Ok(())
    }

    pub fn final_multiplier(&self) -> Multiplier {
        self.result.map(|(_, m)| m).unwrap_or(Multiplier::ZERO)
    }

    pub fn outcome(&self) -> Option<HandOutcome> {
        self.result.map(|(outcome, _)| outcome)
    }

    pub fn detail(&self) -> ResultDetail {
        let (outcome, _) = self
            .result
            .unwrap_or_else(|| settle_hands(&self.player, &self.dealer));
        ResultDetail::Blackjack {
            player: self.player.clone(),
            dealer: self.dealer.clone(),
            player_total: hand_value(&self.player),
            dealer_total: hand_value(&self.dealer),
            outcome,
        }
    }

    fn finish(&mut self) {
        self.status = BlackjackStatus::Finished;
        self.result = Some(settle_hands(&self.player, &self.dealer));
    }

    fn ensure_player_turn(&self) -> Result<(), ValidationError> {
        if self.is_finished() {
            return Err(ValidationError::ActionNotAllowed("hand is already settled".to_string()));
        }
        Ok(())
    }
}

/// One-shot blackjack with a fixed "hit below `stand_on`" strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlackjackStrategy {
    stand_on: u32,
}

impl BlackjackStrategy {
    pub fn new(stand_on: u32) -> Result<Self, ValidationError> {
        if !(12..=21).contains(&stand_on) {
            return Err(ValidationError::InvalidParameter {
                field: "stand_on",
                reason: format!("{} must be between 12 and 21", stand_on),
            });
        }
        Ok(Self { stand_on })
    }

    pub fn play(&self, rng: &mut dyn RandomSource) -> EngineResult<(ResultDetail, Multiplier)> {
        self.play_deck(Deck::shuffled(rng)?)
    }

    pub fn play_deck(&self, deck: Deck) -> EngineResult<(ResultDetail, Multiplier)> {
        let mut round = BlackjackRound::deal_from(deck)?;
        while !round.is_finished() && round.player_total() < self.stand_on {
            round.hit()?;
        }
        if !round.is_finished() {
            round.stand()?;
        }
        Ok((round.detail(), round.final_multiplier()))
    }
}

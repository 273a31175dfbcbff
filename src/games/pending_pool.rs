use crate::common::types::{Money, Multiplier, SubjectId};
use crate::errors::{EngineResult, ValidationError};
use crate::games::blackjack::BlackjackRound;
use crate::games::crash::CrashRound;
use crate::games::mines::MinesRound;
use crate::games::types::{GameType, ResultDetail};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Game state carried between player actions
#[derive(Debug, Clone, PartialEq)]
pub enum RoundState {
    Mines(MinesRound),
    Crash(CrashRound),
    Blackjack(BlackjackRound),
}

impl RoundState {
    pub fn game_type(&self) -> GameType {
        match self {
            RoundState::Mines(_) => GameType::Mines,
            RoundState::Crash(_) => GameType::Crash,
            RoundState::Blackjack(_) => GameType::Blackjack,
        }
    }

    pub fn is_finished(&self) -> bool {
        match self {
            RoundState::Mines(round) => round.is_finished(),
            RoundState::Crash(round) => round.is_finished(),
            RoundState::Blackjack(round) => round.is_finished(),
        }
    }

    pub fn final_multiplier(&self) -> Multiplier {
        match self {
            RoundState::Mines(round) => round.final_multiplier(),
            RoundState::Crash(round) => round.final_multiplier(),
            RoundState::Blackjack(round) => round.final_multiplier(),
        }
    }

    pub fn detail(&self) -> ResultDetail {
        match self {
            RoundState::Mines(round) => round.detail(),
            RoundState::Crash(round) => round.detail(),
            RoundState::Blackjack(round) => round.detail(),
        }
    }

    /// Finish a round the player walked away from: mines forfeits, crash
    /// busts and blackjack stands on the current hand
    pub fn abandon(&mut self) -> EngineResult<()> {
        match self {
            RoundState::Mines(round) => round.forfeit(),
            RoundState::Crash(round) => round.bust(),
            RoundState::Blackjack(round) => round.stand(),
        }
    }
}

/// An interactive round whose bet is reserved but not yet settled
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRound {
    pub round_id: String,
    pub subject: SubjectId,
    pub bet: Money,
    pub started_at: DateTime<Utc>,
    pub state: RoundState,
}

impl ActiveRound {
    pub fn new(subject: SubjectId, bet: Money, state: RoundState) -> Self {
        Self {
            round_id: Uuid::new_v4().to_string(),
            subject,
            bet,
            started_at: Utc::now(),
            state,
        }
    }
}

/// Thread-safe pool of interactive rounds awaiting player actions
#[derive(Clone, Default)]
pub struct ActiveRounds {
    rounds: Arc<DashMap<String, ActiveRound>>,
}

impl ActiveRounds {
    pub fn new() -> Self {
        Self {
            rounds: Arc::new(DashMap::new()),
        }
    }

    /// Add a round to the pool, returning its id
    pub fn insert(&self, round: ActiveRound) -> String {
        let round_id = round.round_id.clone();
        self.rounds.insert(round_id.clone(), round);
        round_id
    }

    /// Apply a player action to a round owned by `subject`.
    ///
    /// The action runs under the round's map entry lock, so two concurrent
    /// actions on one round are applied one after the other.
    pub fn act<T, F>(&self, subject: &SubjectId, round_id: &str, action: F) -> EngineResult<(T, ActiveRound)>
    where
        F: FnOnce(&mut RoundState) -> EngineResult<T>,
    {
        let mut entry = self
            .rounds
            .get_mut(round_id)
            .filter(|entry| &entry.subject == subject)
            .ok_or_else(|| ValidationError::UnknownRound(round_id.to_string()))?;

        let result = action(&mut entry.state)?;
        Ok((result, entry.clone()))
    }

    /// Remove a finished round owned by `subject`; only one caller gets it
    pub fn take_finished(&self, subject: &SubjectId, round_id: &str) -> Option<ActiveRound> {
        self.rounds
            .remove_if(round_id, |_, round| &round.subject == subject && round.state.is_finished())
            .map(|(_, round)| round)
    }

    pub fn is_active(&self, round_id: &str) -> bool {
        self.rounds.contains_key(round_id)
    }

    pub fn active_count(&self) -> usize {
        self.rounds.len()
    }

    /// Owner and id of every round started at or before `cutoff`
    pub fn started_before(&self, cutoff: DateTime<Utc>) -> Vec<(SubjectId, String)> {
        self.rounds
            .iter()
            .filter(|entry| entry.started_at <= cutoff)
            .map(|entry| (entry.subject.clone(), entry.key().clone()))
            .collect()
    }
}

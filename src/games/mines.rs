//! Mines: sequential reveal on a grid with hidden mines
//!
//! After `k` safe reveals the cash-out multiplier is
//! `max(1.00, floor2((1 - edge) / P(k safe)))`, where `P(k safe)` is the
//! hypergeometric probability of picking `k` safe cells in a row.

use crate::common::types::Multiplier;
use crate::errors::{EngineResult, InvariantViolation, ValidationError};
use crate::games::rules::GameRules;
use crate::games::types::ResultDetail;
use crate::rng::{ensure_distinct, sample_distinct, RandomSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Probability that the first `k` reveals are all safe
pub fn survival_probability(grid_size: u32, mines: u32, k: u32) -> f64 {
    (0..k).fold(1.0, |p, i| {
        p * (grid_size - mines - i) as f64 / (grid_size - i) as f64
    })
}

/// Cash-out multiplier after `k` safe reveals
pub fn mines_multiplier(grid_size: u32, mines: u32, k: u32, edge: f64) -> Multiplier {
    if k > grid_size.saturating_sub(mines) {
        return Multiplier::ZERO;
    }
    Multiplier::floor_from_f64((1.0 - edge) / survival_probability(grid_size, mines, k)).max(Multiplier::ONE)
}

/// Validated grid and mine count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinesSetup {
    pub grid_size: u32,
    pub mines: u32,
    pub edge: f64,
}

impl MinesSetup {
    pub fn new(mines: u32, rules: &GameRules) -> Result<Self, ValidationError> {
        let config = &rules.config().mines;
        if mines < config.min_mines || mines > config.max_mines {
            return Err(ValidationError::InvalidParameter {
                field: "mines",
                reason: format!("must be between {} and {}", config.min_mines, config.max_mines),
            });
        }
        Ok(Self {
            grid_size: config.grid_size,
            mines,
            edge: rules.config().house_edge.mines,
        })
    }

    pub fn safe_cells(&self) -> u32 {
        self.grid_size - self.mines
    }

    fn check_cell(&self, cell: u32) -> Result<(), ValidationError> {
        if cell >= self.grid_size {
            return Err(ValidationError::InvalidParameter {
                field: "cell",
                reason: format!("{} is outside a {}-cell grid", cell, self.grid_size),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MinesStatus {
    Active,
    Busted { cell: u32 },
    CashedOut { multiplier: Multiplier },
    /// Abandoned before cashing out; the stake is lost
    Forfeited,
}

/// What a single reveal produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Safe cell; the round continues
    Safe { multiplier: Multiplier },
    /// Last safe cell; the round cashed out automatically
    Cleared { multiplier: Multiplier },
    Mine,
}

/// State of one mines round, held between player actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinesRound {
    setup: MinesSetup,
    mines: Vec<u32>,
    revealed: Vec<u32>,
    status: MinesStatus,
}

impl MinesRound {
    /// Place mines uniformly at random
    pub fn start(setup: MinesSetup, rng: &mut dyn RandomSource) -> EngineResult<Self> {
        let mines = sample_distinct(rng, setup.grid_size, setup.mines as usize, "mines")?;
        Self::with_mines(setup, mines)
    }

    /// Round over a known mine layout
    pub fn with_mines(setup: MinesSetup, mut mines: Vec<u32>) -> EngineResult<Self> {
        ensure_distinct(&mines, "mines")?;
        if mines.len() != setup.mines as usize {
            return Err(InvariantViolation::DrawOutOfRange(format!(
                "{} mines placed, {} expected",
                mines.len(),
                setup.mines
            ))
            .into());
        }
        if let Some(&cell) = mines.iter().find(|&&c| c >= setup.grid_size) {
            return Err(InvariantViolation::DrawOutOfRange(format!("mine at cell {}", cell)).into());
        }
        mines.sort_unstable();

        Ok(Self {
            setup,
            mines,
            revealed: Vec::new(),
            status: MinesStatus::Active,
        })
    }

    pub fn setup(&self) -> &MinesSetup {
        &self.setup
    }

    pub fn status(&self) -> MinesStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status != MinesStatus::Active
    }

    pub fn revealed(&self) -> &[u32] {
        &self.revealed
    }

    pub fn safe_reveals(&self) -> u32 {
        self.revealed.len() as u32
    }

    /// Multiplier if the player cashed out now
    pub fn current_multiplier(&self) -> Multiplier {
        mines_multiplier(self.setup.grid_size, self.setup.mines, self.safe_reveals(), self.setup.edge)
    }

    /// Multiplier after one more safe reveal, `None` when the grid is cleared
    pub fn next_multiplier(&self) -> Option<Multiplier> {
        let next = self.safe_reveals() + 1;
        (next <= self.setup.safe_cells())
            .then(|| mines_multiplier(self.setup.grid_size, self.setup.mines, next, self.setup.edge))
    }

    pub fn reveal(&mut self, cell: u32) -> EngineResult<RevealOutcome> {
        self.ensure_active()?;
        self.setup.check_cell(cell)?;
        if self.revealed.contains(&cell) {
            return Err(ValidationError::ActionNotAllowed(format!("cell {} already revealed", cell)).into());
        }

        if self.mines.binary_search(&cell).is_ok() {
            self.status = MinesStatus::Busted { cell };
            return Ok(RevealOutcome::Mine);
        }

        self.revealed.push(cell);
        let multiplier = self.current_multiplier();
        if self.safe_reveals() == self.setup.safe_cells() {
            self.status = MinesStatus::CashedOut { multiplier };
            return Ok(RevealOutcome::Cleared { multiplier });
        }
        Ok(RevealOutcome::Safe { multiplier })
    }

    /// Lock in the current multiplier; needs at least one safe reveal
    pub fn cash_out(&mut self) -> EngineResult<Multiplier> {
        self.ensure_active()?;
        if self.revealed.is_empty() {
            return Err(ValidationError::ActionNotAllowed("reveal a cell before cashing out".to_string()).into());
        }
        let multiplier = self.current_multiplier();
        self.status = MinesStatus::CashedOut { multiplier };
        Ok(multiplier)
    }

    /// End the round without cashing out
    pub fn forfeit(&mut self) -> EngineResult<()> {
        self.ensure_active()?;
        self.status = MinesStatus::Forfeited;
        Ok(())
    }

    /// Settled multiplier: zero on a mine, the locked value after cash-out
    pub fn final_multiplier(&self) -> Multiplier {
        match self.status {
            MinesStatus::CashedOut { multiplier } => multiplier,
            _ => Multiplier::ZERO,
        }
    }

    pub fn detail(&self) -> ResultDetail {
        ResultDetail::Mines {
            grid_size: self.setup.grid_size,
            mine_positions: self.mines.clone(),
            revealed: self.revealed.clone(),
            hit_mine: match self.status {
                MinesStatus::Busted { cell } => Some(cell),
                _ => None,
            },
        }
    }

    fn ensure_active(&self) -> Result<(), ValidationError> {
        if self.is_finished() {
            return Err(ValidationError::ActionNotAllowed("round is already over".to_string()));
        }
        Ok(())
    }
}

/// One-shot play: preselected cells revealed in order, then cash out
#[derive(Debug, Clone, PartialEq)]
pub struct MinesTicket {
    setup: MinesSetup,
    reveals: Vec<u32>,
}

impl MinesTicket {
    pub fn new(mines: u32, reveals: &[u32], rules: &GameRules) -> Result<Self, ValidationError> {
        let setup = MinesSetup::new(mines, rules)?;
        if reveals.is_empty() || reveals.len() > setup.safe_cells() as usize {
            return Err(ValidationError::InvalidParameter {
                field: "reveals",
                reason: format!("reveal between 1 and {} cells", setup.safe_cells()),
            });
        }
        for &cell in reveals {
            setup.check_cell(cell)?;
        }
        if reveals.iter().collect::<HashSet<_>>().len() != reveals.len() {
            return Err(ValidationError::InvalidParameter {
                field: "reveals",
                reason: "cells must be unique".to_string(),
            });
        }
        Ok(Self {
            setup,
            reveals: reveals.to_vec(),
        })
    }

    pub fn play(&self, rng: &mut dyn RandomSource) -> EngineResult<(ResultDetail, Multiplier)> {
        let round = MinesRound::start(self.setup, rng)?;
        self.play_round(round)
    }

    pub fn play_round(&self, mut round: MinesRound) -> EngineResult<(ResultDetail, Multiplier)> {
        for &cell in &self.reveals {
            match round.reveal(cell)? {
                RevealOutcome::Safe { .. } => continue,
                RevealOutcome::Mine | RevealOutcome::Cleared { .. } => break,
            }
        }
        if !round.is_finished() {
            round.cash_out()?;
        }
        Ok((round.detail(), round.final_multiplier()))
    }
}

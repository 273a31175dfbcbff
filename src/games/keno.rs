//! Keno: numbers drawn without replacement, paid by (picks, matches)

use crate::common::types::Multiplier;
use crate::config::KenoConfig;
use crate::errors::{ConfigurationError, EngineResult, InvariantViolation, ValidationError};
use crate::games::types::ResultDetail;
use crate::rng::{sample_distinct, RandomSource};
use std::collections::HashSet;

/// Paytable rows in hundredths, indexed `[picks - 1][matches]`
const PAYTABLE: [&[u64]; 10] = [
    &[0, 396],
    &[0, 190, 450],
    &[0, 100, 310, 1040],
    &[0, 80, 180, 500, 2250],
    &[0, 25, 140, 410, 1650, 3600],
    &[0, 0, 100, 368, 700, 1650, 4000],
    &[0, 0, 47, 300, 450, 1400, 3100, 6000],
    &[0, 0, 0, 220, 400, 1300, 2200, 5500, 7000],
    &[0, 0, 0, 155, 300, 800, 1500, 4400, 6000, 8500],
    &[0, 0, 0, 140, 225, 450, 800, 1700, 5000, 25000, 1_000_000],
];

/// (picks, matches) lookup; entries not in the table pay nothing
#[derive(Debug, Clone)]
pub struct KenoPaytable {
    rows: Vec<Vec<Multiplier>>,
}

impl KenoPaytable {
    pub fn standard() -> EngineResult<Self> {
        let rows: Vec<Vec<Multiplier>> = PAYTABLE
            .iter()
            .map(|row| row.iter().map(|&h| Multiplier::from_hundredths(h)).collect())
            .collect();

        for (i, row) in rows.iter().enumerate() {
            if row.len() != i + 2 {
                return Err(ConfigurationError::InvalidTable {
                    table: "keno".to_string(),
                    reason: format!("row for {} picks has {} entries", i + 1, row.len()),
                }
                .into());
            }
        }
        Ok(Self { rows })
    }

    pub fn lookup(&self, picks: usize, matches: usize) -> Multiplier {
        picks
            .checked_sub(1)
            .and_then(|row| self.rows.get(row))
            .and_then(|row| row.get(matches))
            .copied()
            .unwrap_or(Multiplier::ZERO)
    }
}

/// Validated keno ticket
#[derive(Debug, Clone, PartialEq)]
pub struct KenoTicket {
    picks: Vec<u32>,
    pool_size: u32,
    draw_count: u32,
}

impl KenoTicket {
    pub fn new(picks: &[u32], config: &KenoConfig) -> Result<Self, ValidationError> {
        if picks.is_empty() || picks.len() > config.max_picks as usize {
            return Err(ValidationError::InvalidParameter {
                field: "picks",
                reason: format!("pick between 1 and {} numbers", config.max_picks),
            });
        }
        if let Some(bad) = picks.iter().find(|&&n| n == 0 || n > config.pool_size) {
            return Err(ValidationError::InvalidParameter {
                field: "picks",
                reason: format!("{} is outside 1..={}", bad, config.pool_size),
            });
        }
        let unique: HashSet<_> = picks.iter().collect();
        if unique.len() != picks.len() {
            return Err(ValidationError::InvalidParameter {
                field: "picks",
                reason: "numbers must be unique".to_string(),
            });
        }

        Ok(Self {
            picks: picks.to_vec(),
            pool_size: config.pool_size,
            draw_count: config.draw_count,
        })
    }

    pub fn draw(
        &self,
        paytable: &KenoPaytable,
        rng: &mut dyn RandomSource,
    ) -> EngineResult<(ResultDetail, Multiplier)> {
        let drawn: Vec<u32> = sample_distinct(rng, self.pool_size, self.draw_count as usize, "keno")?
            .into_iter()
            .map(|n| n + 1)
            .collect();
        self.settle(drawn, paytable)
    }

    /// Score a completed draw. A repeated number is a generator bug.
    pub fn settle(&self, drawn: Vec<u32>, paytable: &KenoPaytable) -> EngineResult<(ResultDetail, Multiplier)> {
        let mut seen = HashSet::with_capacity(drawn.len());
        for &n in &drawn {
            if !seen.insert(n) {
                return Err(InvariantViolation::DuplicateDraw {
                    context: "keno",
                    value: n,
                }
                .into());
            }
        }

        let matches = self.picks.iter().filter(|&p| seen.contains(p)).count();
        let multiplier = paytable.lookup(self.picks.len(), matches);
        let detail = ResultDetail::Keno {
            picks: self.picks.clone(),
            drawn,
            matches: matches as u32,
        };
        Ok((detail, multiplier))
    }
}

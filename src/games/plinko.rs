//! Plinko: `rows` binary steps, bucket = number of right steps

use crate::common::types::Multiplier;
use crate::errors::{ConfigurationError, EngineResult, ValidationError};
use crate::games::types::{ResultDetail, RiskLevel};
use crate::rng::RandomSource;
use std::collections::HashMap;

pub const SUPPORTED_ROWS: [u32; 3] = [8, 12, 16];

/// Bucket multipliers in hundredths, left to right
fn raw_table(rows: u32, risk: RiskLevel) -> Option<&'static [u64]> {
    let table: &'static [u64] = match (rows, risk) {
        (8, RiskLevel::Low) => &[560, 210, 110, 100, 50, 100, 110, 210, 560],
        (8, RiskLevel::Medium) => &[1300, 300, 130, 70, 40, 70, 130, 300, 1300],
        (8, RiskLevel::High) => &[2900, 400, 150, 30, 20, 30, 150, 400, 2900],
        (12, RiskLevel::Low) => &[1000, 300, 160, 140, 110, 100, 50, 100, 110, 140, 160, 300, 1000],
        (12, RiskLevel::Medium) => &[3300, 1100, 400, 200, 110, 60, 30, 60, 110, 200, 400, 1100, 3300],
        (12, RiskLevel::High) => &[17000, 2400, 810, 200, 70, 20, 20, 20, 70, 200, 810, 2400, 17000],
        (16, RiskLevel::Low) => &[
            1600, 900, 200, 140, 140, 120, 110, 100, 50, 100, 110, 120, 140, 140, 200, 900, 1600,
        ],
        (16, RiskLevel::Medium) => &[
            11000, 4100, 1000, 500, 300, 150, 100, 50, 30, 50, 100, 150, 300, 500, 1000, 4100, 11000,
        ],
        (16, RiskLevel::High) => &[
            100_000, 13000, 2600, 900, 400, 200, 20, 20, 20, 20, 20, 200, 400, 900, 2600, 13000, 100_000,
        ],
        _ => return None,
    };
    Some(table)
}

/// All bucket tables, checked for length and symmetry
#[derive(Debug, Clone)]
pub struct PlinkoTables {
    tables: HashMap<(u32, RiskLevel), Vec<Multiplier>>,
}

impl PlinkoTables {
    pub fn standard() -> EngineResult<Self> {
        let mut tables = HashMap::new();
        for rows in SUPPORTED_ROWS {
            for risk in RiskLevel::ALL {
                let name = format!("plinko/{}/{:?}", rows, risk);
                let raw = raw_table(rows, risk).ok_or_else(|| ConfigurationError::InvalidTable {
                    table: name.clone(),
                    reason: "missing".to_string(),
                })?;
                if raw.len() != rows as usize + 1 {
                    return Err(ConfigurationError::InvalidTable {
                        table: name,
                        reason: format!("{} buckets for {} rows", raw.len(), rows),
                    }
                    .into());
                }
                if raw.iter().ne(raw.iter().rev()) {
                    return Err(ConfigurationError::InvalidTable {
                        table: name,
                        reason: "not symmetric".to_string(),
                    }
                    .into());
                }
                tables.insert(
                    (rows, risk),
                    raw.iter().map(|&h| Multiplier::from_hundredths(h)).collect(),
                );
            }
        }
        Ok(Self { tables })
    }

    pub fn buckets(&self, rows: u32, risk: RiskLevel) -> Option<&[Multiplier]> {
        self.tables.get(&(rows, risk)).map(Vec::as_slice)
    }
}

pub fn validate_rows(rows: u32) -> Result<(), ValidationError> {
    if SUPPORTED_ROWS.contains(&rows) {
        Ok(())
    } else {
        Err(ValidationError::InvalidParameter {
            field: "rows",
            reason: format!("{} is not one of {:?}", rows, SUPPORTED_ROWS),
        })
    }
}

/// Drop one ball. The walk is unbiased (right iff `r < 0.5`) at every risk
/// level; risk only changes the bucket table.
pub fn drop_ball(
    rows: u32,
    risk: RiskLevel,
    tables: &PlinkoTables,
    rng: &mut dyn RandomSource,
) -> EngineResult<(ResultDetail, Multiplier)> {
    let buckets = tables.buckets(rows, risk).ok_or_else(|| ValidationError::InvalidParameter {
        field: "rows",
        reason: format!("no table for {} rows", rows),
    })?;

    let mut path = Vec::with_capacity(rows as usize);
    for _ in 0..rows {
        path.push(rng.next_unit()? < 0.5);
    }
    let bucket = path.iter().filter(|&&right| right).count();

    let detail = ResultDetail::Plinko {
        rows,
        risk,
        path,
        bucket: bucket as u32,
    };
    Ok((detail, buckets[bucket]))
}

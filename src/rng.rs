//! Random draw primitive
//!
//! Every outcome generator takes its randomness from a [`RandomSource`]; no
//! other code samples randomness. Production uses [`StdDraws`], tests replay
//! fixed draws with [`ScriptedDraws`].

use crate::errors::{EngineResult, InvariantViolation};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::{HashSet, VecDeque};

/// Source of uniform draws
pub trait RandomSource: Send {
    /// Uniform real in `[0, 1)`
    fn next_unit(&mut self) -> EngineResult<f64>;

    /// Uniform integer in `[0, bound)`; `bound` must be non-zero
    fn next_below(&mut self, bound: u32) -> EngineResult<u32>;
}

/// Draws from the standard generator, seeded from the OS or from a fixed seed
pub struct StdDraws {
    rng: StdRng,
}

impl StdDraws {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible stream, used by simulations and statistical tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdDraws {
    fn next_unit(&mut self) -> EngineResult<f64> {
        Ok(self.rng.gen::<f64>())
    }

    fn next_below(&mut self, bound: u32) -> EngineResult<u32> {
        if bound == 0 {
            return Err(InvariantViolation::DrawOutOfRange("next_below(0)".to_string()).into());
        }
        Ok(self.rng.gen_range(0..bound))
    }
}

/// Replays a fixed list of unit draws.
///
/// `next_below(n)` consumes one unit draw `u` and returns `floor(u * n)`.
/// Running out of draws is reported as an invariant violation so a test that
/// under-scripts a round fails loudly.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDraws {
    draws: VecDeque<f64>,
    consumed: usize,
}

impl ScriptedDraws {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Number of draws handed out so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedDraws {
    fn next_unit(&mut self) -> EngineResult<f64> {
        let draw = self.draws.pop_front().ok_or_else(|| {
            InvariantViolation::DrawOutOfRange(format!("script exhausted after {} draws", self.consumed))
        })?;
        if !(0.0..1.0).contains(&draw) {
            return Err(InvariantViolation::DrawOutOfRange(draw.to_string()).into());
        }
        self.consumed += 1;
        Ok(draw)
    }

    fn next_below(&mut self, bound: u32) -> EngineResult<u32> {
        if bound == 0 {
            return Err(InvariantViolation::DrawOutOfRange("next_below(0)".to_string()).into());
        }
        let unit = self.next_unit()?;
        Ok(((unit * bound as f64) as u32).min(bound - 1))
    }
}

/// In-place Fisher–Yates shuffle
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) -> EngineResult<()> {
    for i in (1..items.len()).rev() {
        let j = rng.next_below(i as u32 + 1)? as usize;
        items.swap(i, j);
    }
    Ok(())
}

/// Draw `count` distinct values from `0..population` without replacement.
///
/// Uses a partial Fisher–Yates over the population, then re-checks the
/// result; a repeated value is reported, never patched up.
pub fn sample_distinct(
    rng: &mut dyn RandomSource,
    population: u32,
    count: usize,
    context: &'static str,
) -> EngineResult<Vec<u32>> {
    if count > population as usize {
        return Err(InvariantViolation::DrawOutOfRange(format!(
            "{}: {} draws from a population of {}",
            context, count, population
        ))
        .into());
    }

    let mut pool: Vec<u32> = (0..population).collect();
    for i in 0..count {
        let remaining = population - i as u32;
        let j = i + rng.next_below(remaining)? as usize;
        pool.swap(i, j);
    }
    pool.truncate(count);

    ensure_distinct(&pool, context)?;
    Ok(pool)
}

/// Fail with [`InvariantViolation::DuplicateDraw`] if any value repeats
pub fn ensure_distinct(values: &[u32], context: &'static str) -> EngineResult<()> {
    let mut seen = HashSet::with_capacity(values.len());
    for &value in values {
        if !seen.insert(value) {
            return Err(InvariantViolation::DuplicateDraw { context, value }.into());
        }
    }
    Ok(())
}

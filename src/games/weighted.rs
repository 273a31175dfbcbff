//! Weighted discrete outcome tables

use crate::errors::{ConfigurationError, EngineResult};
use crate::rng::RandomSource;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Fixed outcome space with weights summing to 1, checked at construction
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    name: String,
    outcomes: Vec<T>,
    cumulative: Vec<f64>,
}

impl<T> WeightedTable<T> {
    pub fn new(name: impl Into<String>, entries: Vec<(T, f64)>) -> EngineResult<Self> {
        let name = name.into();
        if entries.is_empty() {
            return Err(table_error(&name, "table is empty"));
        }

        let mut outcomes = Vec::with_capacity(entries.len());
        let mut cumulative = Vec::with_capacity(entries.len());
        let mut total = 0.0;
        for (outcome, weight) in entries {
            if !weight.is_finite() || weight < 0.0 {
                return Err(table_error(&name, &format!("weight {} is not a probability", weight)));
            }
            total += weight;
            outcomes.push(outcome);
            cumulative.push(total);
        }

        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(table_error(&name, &format!("weights sum to {}, expected 1", total)));
        }

        Ok(Self {
            name,
            outcomes,
            cumulative,
        })
    }

    /// Equal weight for every outcome
    pub fn uniform(name: impl Into<String>, outcomes: Vec<T>) -> EngineResult<Self> {
        let weight = 1.0 / outcomes.len().max(1) as f64;
        Self::new(name, outcomes.into_iter().map(|o| (o, weight)).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[T] {
        &self.outcomes
    }

    /// Probability of the outcome at `index`
    pub fn weight(&self, index: usize) -> f64 {
        match index {
            0 => self.cumulative.first().copied().unwrap_or(0.0),
            i if i < self.cumulative.len() => self.cumulative[i] - self.cumulative[i - 1],
            _ => 0.0,
        }
    }

    /// Index of the outcome selected by one unit draw
    pub fn sample_index(&self, rng: &mut dyn RandomSource) -> EngineResult<usize> {
        let draw = rng.next_unit()?;
        Ok(self.index_for(draw))
    }

    pub fn sample(&self, rng: &mut dyn RandomSource) -> EngineResult<(usize, &T)> {
        let index = self.sample_index(rng)?;
        Ok((index, &self.outcomes[index]))
    }

    /// First outcome whose cumulative weight exceeds `draw`; rounding slack
    /// at the top end falls into the last outcome with non-zero weight.
    fn index_for(&self, draw: f64) -> usize {
        match self.cumulative.iter().position(|&c| draw < c) {
            Some(index) => index,
            None => (0..self.len())
                .rev()
                .find(|&i| self.weight(i) > 0.0)
                .unwrap_or(self.len() - 1),
        }
    }
}

fn table_error(name: &str, reason: &str) -> crate::errors::EngineError {
    ConfigurationError::InvalidTable {
        table: name.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedDraws;

    #[test]
    fn test_rejects_bad_tables() {
        assert!(WeightedTable::<u8>::new("empty", vec![]).is_err());
        assert!(WeightedTable::new("short", vec![('a', 0.5), ('b', 0.4)]).is_err());
        assert!(WeightedTable::new("negative", vec![('a', 1.5), ('b', -0.5)]).is_err());
        assert!(WeightedTable::new("nan", vec![('a', f64::NAN)]).is_err());
    }

    #[test]
    fn test_sampling_follows_cumulative_weights() {
        let table = WeightedTable::new("abc", vec![('a', 0.2), ('b', 0.3), ('c', 0.5)]).unwrap();
        let mut draws = ScriptedDraws::new([0.0, 0.19, 0.2, 0.49, 0.5, 0.999]);
        let picks: Vec<char> = (0..6).map(|_| *table.sample(&mut draws).unwrap().1).collect();
        assert_eq!(picks, vec!['a', 'a', 'b', 'b', 'c', 'c']);
    }

    #[test]
    fn test_uniform_table() {
        let table = WeightedTable::uniform("ten", (0..10).collect::<Vec<u32>>()).unwrap();
        assert_eq!(table.len(), 10);
        assert!((table.weight(3) - 0.1).abs() < 1e-12);
        let mut draws = ScriptedDraws::new([0.95]);
        assert_eq!(table.sample_index(&mut draws).unwrap(), 9);
    }
}

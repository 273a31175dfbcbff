//! Engine configuration with validation, defaults and environment overrides
//!
//! All tunable constants (bet limits, house edges, per-game bounds, storage
//! location) live here. `ConfigLoader` reads TOML, applies `WAGER_*`
//! environment overrides and validates the result.

use crate::common::types::Money;
use crate::errors::{ConfigurationError, EngineResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Complete engine configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: LimitsConfig,
    pub house_edge: HouseEdgeConfig,
    pub dice: DiceConfig,
    pub limbo: LimboConfig,
    pub crash: CrashConfig,
    pub mines: MinesConfig,
    pub keno: KenoConfig,
    pub storage: StorageConfig,
}

/// Bet bounds and starting balance, all in minor units
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub min_bet: Money,
    pub max_bet: Money,
    pub default_balance: Money,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_bet: Money::from_cents(10),
            max_bet: Money::from_units(10_000),
            default_balance: Money::from_units(1_000),
        }
    }
}

/// House edge per formula-driven game, as a fraction (0.01 = 1%)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseEdgeConfig {
    pub dice: f64,
    pub limbo: f64,
    pub crash: f64,
    pub mines: f64,
}

impl Default for HouseEdgeConfig {
    fn default() -> Self {
        Self {
            dice: 0.01,
            limbo: 0.01,
            crash: 0.01,
            mines: 0.01,
        }
    }
}

/// Win chance bounds in percent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceConfig {
    pub min_win_chance: f64,
    pub max_win_chance: f64,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            min_win_chance: 0.01,
            max_win_chance: 98.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimboConfig {
    pub min_target: f64,
    pub max_target: f64,
}

impl Default for LimboConfig {
    fn default() -> Self {
        Self {
            min_target: 1.01,
            max_target: 1_000_000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashConfig {
    /// Probability that a round busts at 1.00x before any tick
    pub instant_bust_probability: f64,
    /// Cap on the crash point
    pub max_multiplier: f64,
    /// Exponential growth rate of the multiplier per tick
    pub growth_per_tick: f64,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            instant_bust_probability: 0.02,
            max_multiplier: 10_000.0,
            growth_per_tick: 0.01,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinesConfig {
    pub grid_size: u32,
    pub min_mines: u32,
    pub max_mines: u32,
}

impl Default for MinesConfig {
    fn default() -> Self {
        Self {
            grid_size: 25,
            min_mines: 1,
            max_mines: 24,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KenoConfig {
    pub pool_size: u32,
    pub draw_count: u32,
    pub max_picks: u32,
}

impl Default for KenoConfig {
    fn default() -> Self {
        Self {
            pool_size: 40,
            draw_count: 10,
            max_picks: 10,
        }
    }
}

/// Account store location
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Wipe the account database when the engine starts
    pub clear_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./wallet_data".to_string(),
            clear_on_start: false,
        }
    }
}

impl EngineConfig {
    /// Settings for throwaway simulations: small bets allowed, fresh database
    pub fn simulation() -> Self {
        Self {
            limits: LimitsConfig {
                min_bet: Money::from_cents(1),
                max_bet: Money::from_units(1_000_000),
                default_balance: Money::from_units(1_000_000),
            },
            storage: StorageConfig {
                data_dir: "./simulation_data".to_string(),
                clear_on_start: true,
            },
            ..Self::default()
        }
    }

    /// Validate all sections; the first failing field is reported
    pub fn validate(&self) -> EngineResult<()> {
        let limits = &self.limits;
        if limits.min_bet.is_zero() {
            return Err(invalid("limits.min_bet", limits.min_bet, "Minimum bet must be positive"));
        }
        if limits.min_bet > limits.max_bet {
            return Err(invalid("limits.max_bet", limits.max_bet, "Maximum bet is below the minimum bet"));
        }

        for (field, edge) in [
            ("house_edge.dice", self.house_edge.dice),
            ("house_edge.limbo", self.house_edge.limbo),
            ("house_edge.crash", self.house_edge.crash),
            ("house_edge.mines", self.house_edge.mines),
        ] {
            if !(0.0..0.5).contains(&edge) {
                return Err(invalid(field, edge, "House edge must be in [0, 0.5)"));
            }
        }

        let dice = &self.dice;
        if !(dice.min_win_chance > 0.0 && dice.min_win_chance < dice.max_win_chance) {
            return Err(invalid("dice.min_win_chance", dice.min_win_chance, "Must be positive and below max_win_chance"));
        }
        // The 1.01x floor must not push the player above an even game
        if dice.max_win_chance * 1.01 > 100.0 {
            return Err(invalid("dice.max_win_chance", dice.max_win_chance, "Must not exceed 100 / 1.01"));
        }

        let limbo = &self.limbo;
        if !(limbo.min_target >= 1.01 && limbo.min_target < limbo.max_target && limbo.max_target.is_finite()) {
            return Err(invalid("limbo.min_target", limbo.min_target, "Must be at least 1.01 and below max_target"));
        }

        let crash = &self.crash;
        if !(0.0..1.0).contains(&crash.instant_bust_probability) {
            return Err(invalid(
                "crash.instant_bust_probability",
                crash.instant_bust_probability,
                "Must be in [0, 1)",
            ));
        }
        if !(crash.max_multiplier >= 1.01 && crash.max_multiplier.is_finite()) {
            return Err(invalid("crash.max_multiplier", crash.max_multiplier, "Must be a finite value of at least 1.01"));
        }
        if !(crash.growth_per_tick > 0.0 && crash.growth_per_tick.is_finite()) {
            return Err(invalid("crash.growth_per_tick", crash.growth_per_tick, "Must be positive"));
        }

        let mines = &self.mines;
        if mines.grid_size < 2 || mines.grid_size > 64 {
            return Err(invalid("mines.grid_size", mines.grid_size, "Grid must hold between 2 and 64 cells"));
        }
        if mines.min_mines == 0 || mines.min_mines > mines.max_mines || mines.max_mines >= mines.grid_size {
            return Err(invalid(
                "mines.max_mines",
                mines.max_mines,
                "Need 1 <= min_mines <= max_mines < grid_size",
            ));
        }

        let keno = &self.keno;
        if keno.draw_count == 0 || keno.draw_count > keno.pool_size {
            return Err(invalid("keno.draw_count", keno.draw_count, "Must be in 1..=pool_size"));
        }
        if keno.max_picks == 0 || keno.max_picks > 10 || keno.max_picks > keno.pool_size {
            return Err(invalid("keno.max_picks", keno.max_picks, "Paytable covers 1 to 10 picks"));
        }

        if self.storage.data_dir.is_empty() {
            return Err(ConfigurationError::ValidationFailed("storage.data_dir is empty".to_string()).into());
        }

        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> crate::errors::EngineError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> EngineResult<EngineConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            EngineConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> EngineResult<EngineConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut EngineConfig) -> EngineResult<()> {
        apply_overrides(config, |key| env::var(key).ok())
    }

    /// Save configuration to file
    pub fn save(&self, config: &EngineConfig, path: &str) -> EngineResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

/// Apply `WAGER_*` overrides read through `lookup`
fn apply_overrides<F>(config: &mut EngineConfig, lookup: F) -> EngineResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    // Limits, in minor units
    if let Some(value) = lookup("WAGER_MIN_BET") {
        config.limits.min_bet = Money::from_cents(parse_env("WAGER_MIN_BET", value)?);
    }
    if let Some(value) = lookup("WAGER_MAX_BET") {
        config.limits.max_bet = Money::from_cents(parse_env("WAGER_MAX_BET", value)?);
    }
    if let Some(value) = lookup("WAGER_DEFAULT_BALANCE") {
        config.limits.default_balance = Money::from_cents(parse_env("WAGER_DEFAULT_BALANCE", value)?);
    }

    // House edges
    if let Some(value) = lookup("WAGER_HOUSE_EDGE_DICE") {
        config.house_edge.dice = parse_env("WAGER_HOUSE_EDGE_DICE", value)?;
    }
    if let Some(value) = lookup("WAGER_HOUSE_EDGE_LIMBO") {
        config.house_edge.limbo = parse_env("WAGER_HOUSE_EDGE_LIMBO", value)?;
    }
    if let Some(value) = lookup("WAGER_HOUSE_EDGE_CRASH") {
        config.house_edge.crash = parse_env("WAGER_HOUSE_EDGE_CRASH", value)?;
    }
    if let Some(value) = lookup("WAGER_HOUSE_EDGE_MINES") {
        config.house_edge.mines = parse_env("WAGER_HOUSE_EDGE_MINES", value)?;
    }

    if let Some(value) = lookup("WAGER_CRASH_INSTANT_BUST") {
        config.crash.instant_bust_probability = parse_env("WAGER_CRASH_INSTANT_BUST", value)?;
    }

    // Storage
    if let Some(value) = lookup("WAGER_DATA_DIR") {
        config.storage.data_dir = value;
    }
    if let Some(value) = lookup("WAGER_CLEAR_ON_START") {
        config.storage.clear_on_start = parse_env("WAGER_CLEAR_ON_START", value)?;
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(field: &str, value: String) -> EngineResult<T> {
    value.parse().map_err(|_| {
        ConfigurationError::InvalidValue {
            field: field.to_string(),
            value,
            reason: format!("Cannot parse as {}", std::any::type_name::<T>()),
        }
        .into()
    })
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> EngineResult<()> {
    ConfigLoader::new().save(&EngineConfig::default(), path)
}

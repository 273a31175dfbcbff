//! Engine assembly
//!
//! Centralizes wiring of rules, stores, ledger and orchestrator so callers
//! only choose a config, a store kind, a random source and a history sink.

use crate::{
    common::traits::{HistorySink, StoreKind, WalletStore},
    config::EngineConfig,
    errors::EngineResult,
    games::GameRules,
    history::TracingHistorySink,
    ledger::{AccountStore, SessionStore, WalletLedger},
    orchestrator::WagerOrchestrator,
    rng::{RandomSource, StdDraws},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Factory for wager engines with different backing stores
pub struct EngineFactory;

impl EngineFactory {
    /// Create a fully wired orchestrator
    pub fn create_engine(
        config: &EngineConfig,
        kind: StoreKind,
        rng: Box<dyn RandomSource>,
        history: Arc<dyn HistorySink>,
    ) -> EngineResult<WagerOrchestrator> {
        let rules = Self::create_rules(config)?;
        let ledger = Self::create_ledger(config, kind)?;
        info!(store = %kind, default_balance = %config.limits.default_balance, "Wager engine ready");
        Ok(WagerOrchestrator::new(ledger, rules, rng, history))
    }

    /// Validate the config and build the shared rule set
    pub fn create_rules(config: &EngineConfig) -> EngineResult<Arc<GameRules>> {
        Ok(Arc::new(GameRules::new(config)?))
    }

    /// Ledger over the store matching `kind`
    pub fn create_ledger(config: &EngineConfig, kind: StoreKind) -> EngineResult<Arc<WalletLedger>> {
        let store = Self::create_store(config, kind)?;
        Ok(Arc::new(WalletLedger::new(store, config.limits.default_balance)))
    }

    /// Open the backing store for `kind`
    pub fn create_store(config: &EngineConfig, kind: StoreKind) -> EngineResult<Arc<dyn WalletStore>> {
        match kind {
            StoreKind::Session => Ok(Arc::new(SessionStore::new())),
            StoreKind::Account => {
                if config.storage.clear_on_start {
                    warn!(path = %config.storage.data_dir, "Clearing account wallets on start");
                } else {
                    info!(path = %config.storage.data_dir, "Preserving existing account wallets");
                }
                let store = AccountStore::open(&config.storage.data_dir, config.storage.clear_on_start)?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// Preset factory methods
impl EngineFactory {
    /// Session wallets, OS entropy, history written to the log
    pub fn create_session_engine(config: &EngineConfig) -> EngineResult<WagerOrchestrator> {
        Self::create_engine(
            config,
            StoreKind::Session,
            Box::new(StdDraws::from_entropy()),
            Arc::new(TracingHistorySink),
        )
    }

    /// Account wallets persisted under `storage.data_dir`
    pub fn create_account_engine(config: &EngineConfig) -> EngineResult<WagerOrchestrator> {
        Self::create_engine(
            config,
            StoreKind::Account,
            Box::new(StdDraws::from_entropy()),
            Arc::new(TracingHistorySink),
        )
    }

    /// Session engine with the simulation preset; `seed` makes runs repeatable
    pub fn create_simulation(seed: Option<u64>) -> EngineResult<WagerOrchestrator> {
        let rng: Box<dyn RandomSource> = match seed {
            Some(seed) => Box::new(StdDraws::seeded(seed)),
            None => Box::new(StdDraws::from_entropy()),
        };
        Self::create_engine(
            &EngineConfig::simulation(),
            StoreKind::Session,
            rng,
            Arc::new(TracingHistorySink),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{Money, SubjectId};
    use crate::config::StorageConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_session_engine() {
        let engine = EngineFactory::create_session_engine(&EngineConfig::default()).unwrap();
        assert_eq!(engine.ledger().store_kind(), StoreKind::Session);

        let wallet = engine.wallet(&SubjectId::session("s1")).await.unwrap();
        assert_eq!(wallet.balance, EngineConfig::default().limits.default_balance);
    }

    #[tokio::test]
    async fn test_account_engine_persists() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig {
            storage: StorageConfig {
                data_dir: dir.path().join("wallets").to_string_lossy().into_owned(),
                clear_on_start: false,
            },
            ..EngineConfig::default()
        };
        let subject = SubjectId::account("alice");

        {
            let engine = EngineFactory::create_account_engine(&config).unwrap();
            assert_eq!(engine.ledger().store_kind(), StoreKind::Account);
            assert!(engine.place_bet(&subject, 25.0).await.unwrap());
        }

        let engine = EngineFactory::create_account_engine(&config).unwrap();
        let wallet = engine.wallet(&subject).await.unwrap();
        assert_eq!(wallet.total_wagered, Money::from_units(25));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.house_edge.dice = 1.5;
        assert!(EngineFactory::create_session_engine(&config).is_err());
    }
}

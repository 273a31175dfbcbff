//! Shared traits and interfaces
//!
//! The ledger and orchestrator only see these abstractions, so the backing
//! store and the history destination are chosen by the caller.

use crate::common::types::SubjectId;
use crate::errors::EngineResult;
use crate::history::HistoryRecord;
use crate::ledger::Wallet;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which kind of store backs a subject's wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Durable, keyed by account identity
    Account,
    /// Ephemeral, keyed by browser session
    Session,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Account => write!(f, "account"),
            StoreKind::Session => write!(f, "session"),
        }
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "account" => Ok(StoreKind::Account),
            "session" => Ok(StoreKind::Session),
            other => Err(format!("unknown store kind '{}'", other)),
        }
    }
}

/// Persistence interface for wallets.
///
/// A `save` that returns `Ok` must be durable for the store's notion of
/// durability; the ledger commits its in-memory state only after that.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Load a wallet, `None` if the subject has never been seen
    async fn load(&self, subject: &SubjectId) -> EngineResult<Option<Wallet>>;

    /// Persist the full wallet state
    async fn save(&self, wallet: &Wallet) -> EngineResult<()>;

    /// Kind of store, for logging and diagnostics
    fn kind(&self) -> StoreKind;
}

/// Fire-and-forget destination for settled rounds.
///
/// Implementations must not block and must not fail the round; a sink that
/// cannot deliver a record logs and drops it.
pub trait HistorySink: Send + Sync {
    fn record(&self, record: HistoryRecord);
}

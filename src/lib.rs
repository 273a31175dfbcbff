//! Wager Engine - virtual-currency wagering and outcome generation
//!
//! A wallet ledger with atomic reserve/credit over durable account storage or
//! ephemeral session storage, a family of provably-bounded outcome generators
//! (threshold, weighted table, without-replacement, sequential reveal, card
//! games), and an orchestrator that sequences validate, reserve, resolve,
//! credit and record for every round.

pub mod common;
pub mod config;
pub mod errors;
pub mod factory;
pub mod games;
pub mod history;
pub mod ledger;
pub mod metrics;
pub mod orchestrator;
pub mod rng;
pub mod storage;

pub use common::traits::{HistorySink, StoreKind, WalletStore};
pub use common::types::{Money, Multiplier, SubjectId};
pub use config::{ConfigLoader, EngineConfig};
pub use errors::{EngineError, EngineResult};
pub use factory::EngineFactory;
pub use games::{resolve, GameOutcome, GameParams, GameRules, GameType, ResultDetail, WagerOutcome, WagerRequest};
pub use history::{ChannelHistorySink, HistoryRecord, TracingHistorySink};
pub use ledger::{AccountStore, SessionStore, Wallet, WalletLedger};
pub use metrics::RtpMonitor;
pub use orchestrator::{PlayResult, RoundReport, RoundView, WagerOrchestrator};
pub use rng::{RandomSource, ScriptedDraws, StdDraws};

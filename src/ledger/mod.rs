//! Wallet ledger
//!
//! One wallet per subject. Every mutation runs under that subject's async
//! lock, writes the new state to the backing store, and only then replaces
//! the cached copy, so a failed write leaves the wallet exactly as it was.

pub mod account_store;
pub mod session_store;

pub use account_store::AccountStore;
pub use session_store::SessionStore;

use crate::common::traits::{StoreKind, WalletStore};
use crate::common::types::{Money, SubjectId};
use crate::errors::{EngineError, EngineResult, InvariantViolation, LedgerError};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Balance and lifetime counters for one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub subject: SubjectId,
    pub balance: Money,
    pub total_wagered: Money,
    pub total_won: Money,
}

impl Wallet {
    /// Fresh wallet with zeroed counters
    pub fn new(subject: SubjectId, balance: Money) -> Self {
        Self {
            subject,
            balance,
            total_wagered: Money::ZERO,
            total_won: Money::ZERO,
        }
    }

    /// Net result over the wallet's lifetime in minor units
    pub fn net_profit(&self) -> i128 {
        self.total_won.signed_diff(self.total_wagered)
    }
}

type WalletSlot = Arc<Mutex<Option<Wallet>>>;

/// Atomic reserve/credit/reset/read over a [`WalletStore`]
pub struct WalletLedger {
    store: Arc<dyn WalletStore>,
    default_balance: Money,
    slots: DashMap<SubjectId, WalletSlot>,
}

impl WalletLedger {
    pub fn new(store: Arc<dyn WalletStore>, default_balance: Money) -> Self {
        Self {
            store,
            default_balance,
            slots: DashMap::new(),
        }
    }

    pub fn store_kind(&self) -> StoreKind {
        self.store.kind()
    }

    pub fn default_balance(&self) -> Money {
        self.default_balance
    }

    /// Debit `amount` for a bet.
    ///
    /// Returns `false` without touching state when `amount` is zero or exceeds
    /// the balance.
    pub async fn reserve(&self, subject: &SubjectId, amount: Money) -> EngineResult<bool> {
        let slot = self.slot(subject);
        let mut guard = slot.lock().await;
        let current = self.ensure_loaded(&mut guard, subject).await?;

        if amount.is_zero() || amount > current.balance {
            debug!(%subject, %amount, balance = %current.balance, "Reserve refused");
            return Ok(false);
        }

        let mut next = current;
        next.balance = next
            .balance
            .checked_sub(amount)
            .ok_or(InvariantViolation::Overflow("reserve balance"))?;
        next.total_wagered = next
            .total_wagered
            .checked_add(amount)
            .ok_or(InvariantViolation::Overflow("total_wagered"))?;

        self.commit(&mut guard, next).await?;
        debug!(%subject, %amount, "Reserved");
        Ok(true)
    }

    /// Add a payout and return the wallet as credited. Zero changes nothing.
    pub async fn credit(&self, subject: &SubjectId, amount: Money) -> EngineResult<Wallet> {
        let slot = self.slot(subject);
        let mut guard = slot.lock().await;
        let mut next = self.ensure_loaded(&mut guard, subject).await?;
        if amount.is_zero() {
            return Ok(next);
        }

        next.balance = next
            .balance
            .checked_add(amount)
            .ok_or(InvariantViolation::Overflow("credit balance"))?;
        next.total_won = next
            .total_won
            .checked_add(amount)
            .ok_or(InvariantViolation::Overflow("total_won"))?;

        self.commit(&mut guard, next.clone()).await?;
        debug!(%subject, %amount, "Credited");
        Ok(next)
    }

    /// Restore the default balance and zero both counters
    pub async fn reset(&self, subject: &SubjectId) -> EngineResult<Wallet> {
        let slot = self.slot(subject);
        let mut guard = slot.lock().await;

        let fresh = Wallet::new(subject.clone(), self.default_balance);
        self.commit(&mut guard, fresh.clone()).await?;
        debug!(%subject, balance = %self.default_balance, "Wallet reset");
        Ok(fresh)
    }

    /// Consistent snapshot of the wallet, creating it on first access
    pub async fn read(&self, subject: &SubjectId) -> EngineResult<Wallet> {
        let slot = self.slot(subject);
        let mut guard = slot.lock().await;
        self.ensure_loaded(&mut guard, subject).await
    }

    fn slot(&self, subject: &SubjectId) -> WalletSlot {
        self.slots
            .entry(subject.clone())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    async fn ensure_loaded(&self, cached: &mut Option<Wallet>, subject: &SubjectId) -> EngineResult<Wallet> {
        if let Some(wallet) = cached.as_ref() {
            return Ok(wallet.clone());
        }

        let loaded = self.store.load(subject).await.map_err(|e| {
            error!(%subject, store = %self.store.kind(), "Wallet load failed: {}", e);
            LedgerError::WalletUnavailable {
                subject: subject.to_string(),
                reason: e.to_string(),
            }
        })?;

        let wallet = match loaded {
            Some(wallet) => wallet,
            None => {
                let wallet = Wallet::new(subject.clone(), self.default_balance);
                self.store.save(&wallet).await.map_err(|e| {
                    error!(%subject, store = %self.store.kind(), "Failed to create wallet: {}", e);
                    persist_failed(subject, e)
                })?;
                debug!(%subject, balance = %wallet.balance, "Wallet created");
                wallet
            }
        };

        *cached = Some(wallet.clone());
        Ok(wallet)
    }

    async fn commit(&self, cached: &mut Option<Wallet>, next: Wallet) -> EngineResult<()> {
        if let Err(e) = self.store.save(&next).await {
            error!(subject = %next.subject, store = %self.store.kind(), "Wallet write failed: {}", e);
            return Err(persist_failed(&next.subject, e).into());
        }
        *cached = Some(next);
        Ok(())
    }
}

fn persist_failed(subject: &SubjectId, cause: EngineError) -> LedgerError {
    LedgerError::PersistFailed {
        subject: subject.to_string(),
        reason: cause.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> WalletLedger {
        WalletLedger::new(Arc::new(SessionStore::new()), Money::from_units(1_000))
    }

    #[tokio::test]
    async fn test_first_access_creates_default_wallet() {
        let ledger = ledger();
        let wallet = ledger.read(&SubjectId::session("s1")).await.unwrap();
        assert_eq!(wallet.balance, Money::from_units(1_000));
        assert_eq!(wallet.total_wagered, Money::ZERO);
        assert_eq!(wallet.total_won, Money::ZERO);
    }

    #[tokio::test]
    async fn test_reserve_and_credit() {
        let ledger = ledger();
        let subject = SubjectId::session("s1");

        assert!(ledger.reserve(&subject, Money::from_units(100)).await.unwrap());
        ledger.credit(&subject, Money::from_units(250)).await.unwrap();

        let wallet = ledger.read(&subject).await.unwrap();
        assert_eq!(wallet.balance, Money::from_units(1_150));
        assert_eq!(wallet.total_wagered, Money::from_units(100));
        assert_eq!(wallet.total_won, Money::from_units(250));
        assert_eq!(wallet.net_profit(), 15_000);
    }

    #[tokio::test]
    async fn test_reserve_refuses_zero_and_overdraw() {
        let ledger = ledger();
        let subject = SubjectId::session("s1");

        assert!(!ledger.reserve(&subject, Money::ZERO).await.unwrap());
        assert!(!ledger.reserve(&subject, Money::from_cents(100_001)).await.unwrap());

        let wallet = ledger.read(&subject).await.unwrap();
        assert_eq!(wallet.balance, Money::from_units(1_000));
        assert_eq!(wallet.total_wagered, Money::ZERO);
    }

    #[tokio::test]
    async fn test_reserve_entire_balance() {
        let ledger = ledger();
        let subject = SubjectId::session("s1");

        assert!(ledger.reserve(&subject, Money::from_units(1_000)).await.unwrap());
        assert_eq!(ledger.read(&subject).await.unwrap().balance, Money::ZERO);
        assert!(!ledger.reserve(&subject, Money::from_cents(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_credit_is_noop() {
        let ledger = ledger();
        let subject = SubjectId::session("s1");
        let wallet = ledger.credit(&subject, Money::ZERO).await.unwrap();
        assert_eq!(wallet, Wallet::new(subject.clone(), Money::from_units(1_000)));
        assert_eq!(ledger.read(&subject).await.unwrap().total_won, Money::ZERO);
    }

    #[tokio::test]
    async fn test_credit_returns_updated_wallet() {
        let ledger = ledger();
        let subject = SubjectId::session("s1");
        ledger.reserve(&subject, Money::from_units(10)).await.unwrap();

        let wallet = ledger.credit(&subject, Money::from_units(25)).await.unwrap();
        assert_eq!(wallet.balance, Money::from_units(1_015));
        assert_eq!(wallet, ledger.read(&subject).await.unwrap());
    }

    #[tokio::test]
    async fn test_reset() {
        let ledger = ledger();
        let subject = SubjectId::session("s1");

        ledger.reserve(&subject, Money::from_units(400)).await.unwrap();
        ledger.credit(&subject, Money::from_units(10)).await.unwrap();
        let wallet = ledger.reset(&subject).await.unwrap();

        assert_eq!(wallet, Wallet::new(subject.clone(), Money::from_units(1_000)));
        assert_eq!(ledger.read(&subject).await.unwrap(), wallet);
    }

    #[tokio::test]
    async fn test_subjects_are_independent() {
        let ledger = ledger();
        let a = SubjectId::session("a");
        let b = SubjectId::account("a");

        ledger.reserve(&a, Money::from_units(10)).await.unwrap();
        assert_eq!(ledger.read(&b).await.unwrap().balance, Money::from_units(1_000));
    }
}

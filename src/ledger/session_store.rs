//! In-memory wallet store for anonymous browser sessions

use crate::common::traits::{StoreKind, WalletStore};
use crate::common::types::SubjectId;
use crate::errors::EngineResult;
use crate::ledger::Wallet;
use async_trait::async_trait;
use dashmap::DashMap;

/// Ephemeral store; everything is lost when it is dropped
#[derive(Debug, Default)]
pub struct SessionStore {
    wallets: DashMap<SubjectId, Wallet>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for SessionStore {
    async fn load(&self, subject: &SubjectId) -> EngineResult<Option<Wallet>> {
        Ok(self.wallets.get(subject).map(|entry| entry.value().clone()))
    }

    async fn save(&self, wallet: &Wallet) -> EngineResult<()> {
        self.wallets.insert(wallet.subject.clone(), wallet.clone());
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Session
    }
}

//! Durable wallet store keyed by account identity, backed by RocksDB

use crate::common::traits::{StoreKind, WalletStore};
use crate::common::types::SubjectId;
use crate::errors::{EngineResult, StorageError};
use crate::ledger::Wallet;
use crate::storage::WalletDb;
use async_trait::async_trait;
use std::path::Path;

const WALLET_PREFIX: &str = "wallet:";

/// Wallets serialized as JSON under `wallet:<subject key>`
#[derive(Clone)]
pub struct AccountStore {
    db: WalletDb,
}

impl AccountStore {
    pub fn open<P: AsRef<Path>>(path: P, clear_on_start: bool) -> EngineResult<Self> {
        Ok(Self {
            db: WalletDb::open(path, clear_on_start)?,
        })
    }

    pub fn from_db(db: WalletDb) -> Self {
        Self { db }
    }
}

fn wallet_key(subject: &SubjectId) -> String {
    format!("{}{}", WALLET_PREFIX, subject.storage_key())
}

async fn run_blocking<T, F>(f: F) -> EngineResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> EngineResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::TaskFailed(e.to_string()))?
}

#[async_trait]
impl WalletStore for AccountStore {
    async fn load(&self, subject: &SubjectId) -> EngineResult<Option<Wallet>> {
        let db = self.db.clone();
        let key = wallet_key(subject);
        let bytes = run_blocking(move || db.get(key.as_bytes())).await?;

        match bytes {
            Some(bytes) => {
                let wallet: Wallet = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::CorruptedData(format!("{}: {}", subject, e)))?;
                Ok(Some(wallet))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, wallet: &Wallet) -> EngineResult<()> {
        let db = self.db.clone();
        let key = wallet_key(&wallet.subject);
        let value = serde_json::to_vec(wallet)?;
        run_blocking(move || db.put(key.as_bytes(), &value)).await
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Account
    }
}
